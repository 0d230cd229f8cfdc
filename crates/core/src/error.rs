use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuideError {
    #[error("dataset unavailable: {0}")]
    DatasetUnavailable(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GuideError {
    pub fn dataset(message: impl Into<String>) -> Self {
        Self::DatasetUnavailable(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// True when the caller, not the operator, has to fix the input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}
