use super::state::PersisterState;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BufferError {
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("Buffer is {state}, operation not permitted")]
    IllegalState { state: PersisterState },

    #[error("No Tokio runtime available to host the drain worker")]
    NoRuntime,
}

impl BufferError {
    pub(crate) fn absent(name: &'static str) -> Self {
        BufferError::InvalidArgument {
            name,
            reason: "value is absent".to_string(),
        }
    }

    /// True when the caller passed something unusable; retrying the same call
    /// cannot succeed.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, BufferError::InvalidArgument { .. })
    }

    /// True when the buffer no longer accepts the operation because it is
    /// shutting down or stopped.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, BufferError::IllegalState { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let absent = BufferError::absent("measurement");
        assert!(absent.is_invalid_argument());
        assert!(!absent.is_illegal_state());

        let stopped = BufferError::IllegalState {
            state: PersisterState::Stopped,
        };
        assert!(stopped.is_illegal_state());
        assert!(!stopped.is_invalid_argument());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            BufferError::absent("measurements").to_string(),
            "Invalid argument `measurements`: value is absent"
        );
        assert_eq!(
            BufferError::IllegalState {
                state: PersisterState::ShuttingDown
            }
            .to_string(),
            "Buffer is shutting down, operation not permitted"
        );
    }
}
