use crate::analyzer::AggregatorError;
use crate::app::config::ConfigError;
use crate::buffer::BufferError;
use crate::store::StoreError;
use thiserror::Error;

/// Top-level error type for code that drives both the buffer and the analyzer.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("Aggregator error: {0}")]
    Aggregator(#[from] AggregatorError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PersisterState;

    #[test]
    fn test_wraps_module_errors() {
        let err: DomainError = BufferError::IllegalState {
            state: PersisterState::Stopped,
        }
        .into();
        assert!(matches!(err, DomainError::Buffer(_)));
        assert_eq!(
            err.to_string(),
            "Buffer error: Buffer is stopped, operation not permitted"
        );
    }

    #[test]
    fn test_panic_message_variants() {
        let payload = std::panic::catch_unwind(|| panic!("static text")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static text");

        let payload = std::panic::catch_unwind(|| panic!("formatted {}", 42)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted 42");

        let payload = std::panic::catch_unwind(|| std::panic::panic_any(7_u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
