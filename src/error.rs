use std::time::Duration;

/// Boxed error returned by external collaborators (scheduler builder, discovery, sinks)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the lifecycle coordinator
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Startup configuration is incomplete or malformed
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// The external scheduler failed to build; the cause is passed through untouched
    #[error(transparent)]
    Construction(BoxError),

    /// `run` was called on a handle that has already been run
    #[error("scheduler already started")]
    AlreadyStarted,

    /// The run context was cancelled before every tracked feed synced
    #[error("failed to wait cache sync")]
    CacheSyncTimeout,

    /// Background tasks were still running when the drain timeout elapsed
    #[error("shutdown timed out after {elapsed:?}, tasks still running: {remaining:?}")]
    ShutdownTimeout {
        elapsed: Duration,
        remaining: Vec<String>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap a scheduler construction failure
    pub fn construction(cause: BoxError) -> Self {
        Self::Construction(cause)
    }

    /// True if the service never became ready
    pub fn is_sync_timeout(&self) -> bool {
        matches!(self, Self::CacheSyncTimeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, thiserror::Error)]
    #[error("apiserver unreachable")]
    struct Unreachable {
        #[source]
        inner: std::io::Error,
    }

    #[test]
    fn construction_keeps_cause_display_and_source() {
        let cause = Unreachable {
            inner: std::io::Error::other("connection refused"),
        };
        let err = Error::construction(Box::new(cause));

        assert_eq!(err.to_string(), "apiserver unreachable");
        assert_eq!(err.source().unwrap().to_string(), "connection refused");
        assert!(!err.is_sync_timeout());
    }

    #[test]
    fn sync_timeout_message() {
        assert_eq!(
            Error::CacheSyncTimeout.to_string(),
            "failed to wait cache sync"
        );
        assert!(Error::CacheSyncTimeout.is_sync_timeout());
    }
}
