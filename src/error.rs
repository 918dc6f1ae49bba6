use crate::data::SectionId;

/// Errors raised around a matching run. "No swap found" is never one of them.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown section: {0}")]
    UnknownSection(SectionId),

    #[error("Invalid section {id}: {reason}")]
    InvalidSection { id: SectionId, reason: String },

    #[error("Invalid swap: {0}")]
    InvalidSwap(String),

    #[error("Audit log error: {0}")]
    Audit(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::Config(err.to_string())
    }
}
