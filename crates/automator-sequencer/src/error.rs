//! Error types for the sequencer

use automator_core::ActionError;
use thiserror::Error;

/// Result type for sequencer operations
pub type SequencerResult<T> = Result<T, SequencerError>;

/// Errors raised when starting a run
#[derive(Debug, Error)]
pub enum SequencerError {
    /// An input value has no corresponding action kind
    #[error(transparent)]
    UnsupportedAction(#[from] ActionError),
}
