use thiserror::Error;

/// A remote call that produced no usable reply.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode reply: {0}")]
    Decode(String),

    #[error("transport error: {0}")]
    Other(String),
}
