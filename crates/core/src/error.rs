use crate::checkpoint::QuestionId;

#[derive(Debug, thiserror::Error)]
pub enum HuntError {
    #[error("Checkpoint not found: {0}")]
    CheckpointNotFound(QuestionId),

    #[error("Checkpoint already collected: {0}")]
    AlreadyCollected(QuestionId),

    #[error("Checkpoint is {distance_m:.1} m away, too far to collect")]
    OutOfRange { distance_m: f64 },

    #[error("Hunt time limit has passed")]
    HuntExpired,

    #[error("Option {0} does not exist for this checkpoint")]
    InvalidOption(usize),

    #[error("Checkpoint {0} expects a different kind of answer")]
    WrongTask(QuestionId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, HuntError>;
