//! Playback file schema

use automator_core::{actions_from_values, Action};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::YamlLoader;

fn default_iterations() -> usize {
    1
}

/// Run settings shared by every iteration of a playback
///
/// Delays are given in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunSettings {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub step_delay: u64,
    #[serde(default)]
    pub iteration_delay: u64,
}

impl RunSettings {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay)
    }

    pub fn iteration_delay(&self) -> Duration {
        Duration::from_millis(self.iteration_delay)
    }
}

/// A playback file: run settings, iteration count and raw actions
///
/// ```yaml
/// debug: false
/// step_delay: 100
/// iteration_delay: 1000
/// iterations: 3
/// actions:
///   - right x3
///   - 250
///   - !include combos/jump.yaml
///   - enter
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackFile {
    #[serde(flatten)]
    pub settings: RunSettings,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default)]
    pub actions: Vec<serde_json::Value>,
}

impl Default for PlaybackFile {
    fn default() -> Self {
        Self {
            settings: RunSettings::default(),
            iterations: default_iterations(),
            actions: Vec::new(),
        }
    }
}

impl PlaybackFile {
    /// Load a playback file, resolving includes relative to it
    ///
    /// Every action is checked before returning, so an unsupported entry
    /// fails the load instead of the run.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut loader = YamlLoader::new(base_dir);
        let file_name = path.file_name().map(Path::new).unwrap_or(path);
        let raw = loader.load_file(file_name)?;

        let playback = Self::from_yaml(raw)?;
        info!(
            path = %path.display(),
            actions = playback.actions.len(),
            iterations = playback.iterations,
            "Loaded playback file"
        );
        Ok(playback)
    }

    /// Build from an already processed YAML value
    pub fn from_yaml(raw: serde_yaml::Value) -> ConfigResult<Self> {
        let playback: Self =
            serde_yaml::from_value(raw).map_err(|e| ConfigError::InvalidValue {
                key: "playback".to_string(),
                reason: e.to_string(),
            })?;
        playback.validate()?;
        Ok(playback)
    }

    /// Check that every action has a supported kind
    pub fn validate(&self) -> ConfigResult<()> {
        self.to_actions().map(|_| ())
    }

    /// Convert the raw actions into typed ones
    pub fn to_actions(&self) -> ConfigResult<Vec<Action>> {
        actions_from_values(self.actions.iter().cloned()).map_err(|e| ConfigError::InvalidValue {
            key: "actions".to_string(),
            reason: e.to_string(),
        })
    }
}
