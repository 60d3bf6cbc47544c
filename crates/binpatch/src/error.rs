use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed pattern: {0}")]
    MalformedPattern(String),

    #[error("Length mismatch: find is {find} bytes, but replace is {replace} bytes")]
    LengthMismatch { find: usize, replace: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Whether the error belongs to a single task's inputs rather than the target file.
    ///
    /// Task errors are reported and the batch moves on; anything else is fatal.
    pub fn is_task_error(&self) -> bool {
        matches!(self, Error::MalformedPattern(_) | Error::LengthMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.is_not_found());

        let other_io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err2 = Error::Io(other_io_err);
        assert!(!err2.is_not_found());
    }

    #[test]
    fn test_task_errors() {
        assert!(Error::MalformedPattern("x".to_string()).is_task_error());
        assert!(Error::LengthMismatch { find: 1, replace: 2 }.is_task_error());

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::Io(io_err).is_task_error());
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = Error::LengthMismatch { find: 1, replace: 2 };
        assert_eq!(
            err.to_string(),
            "Length mismatch: find is 1 bytes, but replace is 2 bytes"
        );
    }
}
