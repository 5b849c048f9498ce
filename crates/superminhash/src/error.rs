//! Error type shared by all signature operations.

use thiserror::Error;

/// Errors returned when constructing, comparing or merging signatures.
///
/// Neither kind is transient: every operation is an in-memory computation, so
/// retrying with the same arguments fails the same way.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The requested signature length is outside `1..=MAX_LENGTH`.
    #[error("invalid config: signature length must be in 1..={max} (got {length})")]
    InvalidLength { length: usize, max: usize },

    /// A slot value passed to `from_values` is not a finite number in `[0, length]`.
    #[error("invalid config: slot {index} must hold a finite value in [0, {length}]")]
    InvalidValue { index: usize, length: usize },

    /// Two signatures of different lengths were combined.
    #[error("signatures not of same length: left has length {left}, right has length {right}")]
    LengthMismatch { left: usize, right: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_length() {
        let err = SignatureError::InvalidLength { length: 0, max: 16 };
        assert!(err.to_string().contains("invalid config"));
        assert!(err.to_string().contains("got 0"));
    }

    #[test]
    fn error_display_invalid_value() {
        let err = SignatureError::InvalidValue { index: 2, length: 4 };
        assert_eq!(
            err.to_string(),
            "invalid config: slot 2 must hold a finite value in [0, 4]"
        );
    }

    #[test]
    fn error_display_length_mismatch() {
        let err = SignatureError::LengthMismatch { left: 10, right: 11 };
        assert_eq!(
            err.to_string(),
            "signatures not of same length: left has length 10, right has length 11"
        );
    }

    #[test]
    fn error_partial_eq() {
        let a = SignatureError::LengthMismatch { left: 1, right: 2 };
        assert_eq!(a.clone(), a);
        assert_ne!(a, SignatureError::InvalidLength { length: 0, max: 16 });
    }
}
