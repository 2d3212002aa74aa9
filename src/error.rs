//! Engine error type.
//!
//! Every operation in this crate is a pure function over caller-supplied
//! values, so the only failure is bad input. Out-of-range values are rejected
//! here rather than clamped, which keeps caller bugs visible.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument { field: &'static str, reason: String },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending argument, if this is an argument error.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidArgument { field, .. } => Some(field),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(format!("json decode failed: {err}"))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = EngineError::invalid("decay_rate", "must be > 0, got -1");
        assert_eq!(
            err.to_string(),
            "invalid argument `decay_rate`: must be > 0, got -1"
        );
        assert_eq!(err.field(), Some("decay_rate"));
    }

    #[test]
    fn test_json_error_maps_to_config() {
        let err: EngineError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        assert_eq!(err.field(), None);
    }
}
