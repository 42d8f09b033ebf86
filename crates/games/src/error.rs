//! Error types for environment, agent and run operations.

use thermal_core::CoreError;
use thiserror::Error;

/// Errors that can occur while training or evaluating a controller.
///
/// Every variant is a contract violation: nothing here is transient, so a
/// failing run is aborted and it is up to the caller to start a new one.
#[derive(Debug, Clone, Error)]
pub enum GameError {
    /// Action index outside the fixed action set.
    #[error("Invalid action {action} (action set has {count} actions)")]
    InvalidAction { action: usize, count: usize },

    /// State index outside the Q-table.
    #[error("State {state} out of bounds (table has {bins} states)")]
    StateOutOfBounds { state: usize, bins: usize },

    /// Population ratio outside `[0, 1]`.
    #[error("Population ratio {ratio} must be in [0, 1]")]
    InvalidRatio { ratio: f64 },

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Configuration document could not be parsed.
    #[error("Config parse error: {message}")]
    ConfigParse { message: String },

    /// `update` called while the agent is in evaluation mode.
    #[error("Agent is in evaluation mode; learning updates are disabled")]
    LearningDisabled,

    /// Evaluation produced no samples to summarize.
    #[error("Evaluation needs at least one episode and one step")]
    EmptyEvaluation,

    /// Training episodes with no steps have no means to record.
    #[error("Training episodes need at least one step")]
    EmptyEpisode,

    /// An evaluation record whose series disagree in length.
    #[error("Record field {field} has {found} samples, expected {expected}")]
    RecordLengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    /// Comfort model rejected a query.
    #[error(transparent)]
    Comfort(#[from] CoreError),
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::ConfigParse {
            message: err.to_string(),
        }
    }
}
