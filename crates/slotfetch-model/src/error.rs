use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid page number: {0} (pages start at 1)")]
    InvalidPage(u32),

    #[error("unknown query kind: {0}")]
    UnknownQueryKind(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
