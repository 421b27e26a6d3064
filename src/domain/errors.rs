//! Pipeline-level failures
//!
//! Individual malformed records never show up here; they are dropped by the
//! normalizer. Only whole-cycle failures surface to callers.

use thiserror::Error;

/// Failure to obtain a payload from the lap feed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The feed (or the proxy in front of it) answered with a non-success status
    #[error("Lap feed responded with HTTP status {status}")]
    Status { status: u16 },

    /// Connection, timeout or body decoding problem
    #[error("Lap feed request failed: {0}")]
    Transport(String),
}

impl FeedError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// HTTP status carried by the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            Self::Transport(_) => None,
        }
    }
}

/// Failure of a whole fetch cycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The payload was valid JSON but not a list of records
    #[error("Lap feed returned {found} where a list of laps was expected")]
    InvalidResponseShape { found: &'static str },

    #[error(transparent)]
    Fetch(#[from] FeedError),
}

impl PipelineError {
    pub fn invalid_shape(payload: &serde_json::Value) -> Self {
        let found = match payload {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
            serde_json::Value::Object(_) => "an object",
        };
        Self::InvalidResponseShape { found }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_messages_are_human_readable() {
        let errors = vec![
            PipelineError::invalid_shape(&json!({"laps": []})),
            PipelineError::from(FeedError::Status { status: 502 }),
            PipelineError::from(FeedError::transport("connection refused")),
        ];

        for error in errors {
            let message = error.to_string();
            assert!(!message.is_empty());
            assert!(!message.contains("PipelineError"));
        }
    }

    #[test]
    fn test_status_is_carried_through() {
        let error = PipelineError::from(FeedError::Status { status: 404 });
        assert!(error.to_string().contains("404"));
        assert!(matches!(
            error,
            PipelineError::Fetch(ref feed) if feed.status() == Some(404)
        ));
    }

    #[test]
    fn test_invalid_shape_names_the_payload_kind() {
        let error = PipelineError::invalid_shape(&json!({"data": []}));
        assert_eq!(
            error,
            PipelineError::InvalidResponseShape {
                found: "an object"
            }
        );
        assert!(error.to_string().contains("an object"));
    }
}
