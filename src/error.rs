use thiserror::Error;

/// Failures surfaced by session actions. Every variant is recoverable: the
/// session is left exactly as it was before the refused call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("season complete: all rounds have been played, reset the season to continue")]
    SeasonComplete,

    #[error("insufficient funds: candidate costs {needed}, club has {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("no scout candidate with id {0}")]
    InvalidCandidate(String),

    #[error("could not load roster from {source_name}: {reason}")]
    RosterLoad { source_name: String, reason: String },
}

impl EngineError {
    pub fn roster(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::RosterLoad {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}
