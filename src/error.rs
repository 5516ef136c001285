use thiserror::Error;

#[derive(Debug, Error)]
pub enum FusionError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid option: {0}")]
    InvalidOption(String),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("AWS error: {0}")]
    AwsError(String),
    #[error("AWS service error: {0}")]
    AwsServiceError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FusionError>;

/// Errors surfaced to the user by a generation attempt.
///
/// Provider failures never leak through here: every one of them collapses
/// into [`GenerationError::GenerationFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Please upload both images.")]
    MissingInput,
    #[error("A generation is already in progress.")]
    AlreadyInProgress,
    #[error("Failed to generate image. Please try again.")]
    GenerationFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            GenerationError::MissingInput.to_string(),
            "Please upload both images."
        );
        assert_eq!(
            GenerationError::GenerationFailed.to_string(),
            "Failed to generate image. Please try again."
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
        let err: FusionError = io.into();
        assert!(matches!(err, FusionError::IoError(_)));
        assert!(err.to_string().contains("missing.png"));
    }
}
