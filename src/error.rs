use thiserror::Error;

/// Store-layer error type.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by this crate.
///
/// Evaluation itself is total and never fails; errors only arise from
/// identifier/slug validation and from the snapshot loading path.
#[derive(Debug, Error)]
pub enum Error {
    /// Store error wrapper.
    #[error("store error: {0}")]
    Store(#[source] StoreError),
    /// Invalid identifier input.
    #[error("invalid id: {0}")]
    InvalidId(String),
    /// Invalid permission slug input.
    #[error("invalid permission: {0}")]
    InvalidPermission(String),
    /// Invalid limit key input.
    #[error("invalid limit key: {0}")]
    InvalidLimitKey(String),
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}
