//! Action sequencer
//!
//! This crate provides the playback engine: it runs a list of actions one
//! at a time, optionally for several iterations, waiting on handlers that
//! return deferred results before moving on.
//!
//! # Components
//!
//! - [`expand_actions`] - resolves `<cmd>x<N>` repeat shorthands
//! - [`Handlers`] - per-kind handler table with overridable defaults
//! - [`continuation`] - waits on deferred handler results
//! - the step scheduler and iteration controller, driven by one loop per run
//! - [`Sequencer`] - starts and kills runs
//!
//! # Example
//!
//! ```ignore
//! use automator_sequencer::{Action, IterationCallback, RunConfig, Sequencer};
//! use std::time::Duration;
//!
//! let sequencer = Sequencer::new(RunConfig::new().with_step_delay(Duration::from_millis(50)));
//! let done = sequencer.run(
//!     vec![Action::from("right x3"), Action::delay_ms(200), Action::from("enter")],
//!     2,
//!     Some(IterationCallback::new(|i| serde_json::json!(i))),
//! );
//! assert_eq!(done.await, serde_json::json!(1));
//! ```

/// Debug-level diagnostics, emitted only when the run was configured with
/// `debug`
macro_rules! diag {
    ($enabled:expr, $($arg:tt)+) => {
        if $enabled {
            tracing::debug!(target: "automator", $($arg)+);
        }
    };
}

mod config;
pub mod continuation;
mod error;
mod expand;
mod handlers;
mod iteration;
mod scheduler;
mod sequencer;

pub use automator_core::{
    Action, Callback, Context, Deferred, HandlerResult, KeyEvent, Resolver, Settlement,
};
pub use config::{DeferredFactory, RunConfig};
pub use error::{SequencerError, SequencerResult};
pub use expand::{expand_actions, RepeatShorthand, MAX_REPEAT};
pub use handlers::{
    do_function, do_number, do_object, key_press_handler, FunctionHandler, Handlers,
    NumberHandler, ObjectHandler, StringHandler,
};
pub use scheduler::{IterationCallback, Phase};
pub use sequencer::{Completion, Sequencer};
