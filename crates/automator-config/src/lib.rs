//! YAML playback files
//!
//! A playback file holds the run settings, the iteration count and the raw
//! action list. Two custom tags are understood while loading:
//!
//! - `!include path` - Include another YAML file; an included list is
//!   spliced into the list that includes it
//! - `!env_var VAR [default]` - Environment variable substitution
//!
//! # Example
//!
//! ```ignore
//! use automator_config::PlaybackFile;
//!
//! let playback = PlaybackFile::load("plays/farm.yaml")?;
//! let actions = playback.to_actions()?;
//! ```

mod error;
mod loader;
mod playback;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, load_yaml_string, YamlLoader};
pub use playback::{PlaybackFile, RunSettings};

// Re-export serde_yaml::Value for convenience
pub use serde_yaml::Value;
