//! Common result and error types for the Breeze toolchain.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates a broken internal invariant (a bug in Breeze), not a
/// problem with user input. Stylesheet and content problems are reported
/// through the diagnostics sink and the operation still returns `Ok`.
pub type BreezeResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Breeze, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("layer node vanished");
        assert_eq!(format!("{err}"), "internal error: layer node vanished");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }

    #[test]
    fn err_path() {
        let r: BreezeResult<()> = Err(InternalError::new("boom"));
        assert_eq!(r.unwrap_err().message, "boom");
    }
}
