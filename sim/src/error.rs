use dmwda_retarget::RetargetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("retarget error: {0}")]
    Retarget(#[from] RetargetError),

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("report serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
