//! Error type shared by every stage of the evaluation pipeline.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An input tensor has the wrong dimensionality.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// A caller-supplied parameter violates a precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A condition or event name outside the closed label set.
    #[error("unknown label: {0:?}")]
    UnknownLabel(String),

    /// The learner failed to fit or predict.
    #[error("learner failed: {0:#}")]
    Learner(#[source] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed on-disk recording set.
    #[error("malformed recording file: {0}")]
    Format(String),
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Format(value.to_string())
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(value: ndarray::ShapeError) -> Self {
        Error::InvalidShape(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
