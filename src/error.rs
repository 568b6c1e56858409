/// Convenience result type used across the engine.
pub type PhotocycleResult<T> = Result<T, PhotocycleError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Nothing in this taxonomy is fatal: every failure leaves previously valid
/// state intact and is surfaced to the caller for display.
#[derive(thiserror::Error, Debug)]
pub enum PhotocycleError {
    /// Invalid user-provided or schedule data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while decoding or encoding a recipe document.
    #[error("recipe error: {0}")]
    Recipe(String),

    /// Malformed or empty output from the keyframe generation service.
    #[error("generation error: {0}")]
    Generation(String),

    /// Write or connection failures on the hardware frame sink.
    #[error("transport error: {0}")]
    Transport(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PhotocycleError {
    /// Build a [`PhotocycleError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PhotocycleError::Recipe`] value.
    pub fn recipe(msg: impl Into<String>) -> Self {
        Self::Recipe(msg.into())
    }

    /// Build a [`PhotocycleError::Generation`] value.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Build a [`PhotocycleError::Transport`] value.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_taxonomy_prefix() {
        let err = PhotocycleError::validation("bad grid");
        assert_eq!(err.to_string(), "validation error: bad grid");
        let err = PhotocycleError::transport("write failed");
        assert_eq!(err.to_string(), "transport error: write failed");
    }

    #[test]
    fn anyhow_errors_wrap_transparently() {
        let inner = anyhow::anyhow!("underlying io failure");
        let err = PhotocycleError::from(inner);
        assert_eq!(err.to_string(), "underlying io failure");
    }
}
