/// Convenience result type used across gridflight.
pub type FlightResult<T> = Result<T, FlightError>;

/// Top-level error taxonomy used by path, camera and pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum FlightError {
    /// Factorial or binomial argument outside the supported table range.
    #[error("domain error: {0}")]
    Domain(String),

    /// Degenerate request, e.g. a curve evaluation with fewer than two samples.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Shader, pipeline or render target creation failed. Always fatal.
    #[error("resource creation failed in {stage}: {message}")]
    ResourceCreation {
        /// Name of the pipeline stage or resource being created.
        stage: String,
        /// Diagnostic reported by the GPU layer.
        message: String,
    },

    /// Invalid scene parameters or configuration file contents.
    #[error("validation error: {0}")]
    Validation(String),

    /// GPU-level error surfaced while producing a single frame.
    #[error("frame error: {0}")]
    Frame(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlightError {
    /// Build a [`FlightError::Domain`] value.
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    /// Build a [`FlightError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build a [`FlightError::ResourceCreation`] value naming the failing stage.
    pub fn resource(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResourceCreation {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Build a [`FlightError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlightError::Frame`] value.
    pub fn frame(msg: impl Into<String>) -> Self {
        Self::Frame(msg.into())
    }

    /// Whether the frame loop must stop when it sees this error.
    ///
    /// Only per-frame GPU errors are recoverable; everything else means the pipeline is not in a
    /// state that can produce another frame.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Frame(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
