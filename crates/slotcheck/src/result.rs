//! Result and error types for slotcheck.

use thiserror::Error;

/// Result type for slotcheck operations
pub type SlotCheckResult<T> = Result<T, SlotCheckError>;

/// Errors that can occur while driving the page under test
#[derive(Debug, Error)]
pub enum SlotCheckError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A bounded wait expired before its condition held
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Description of the condition
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Script evaluation or element call failed
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Element handle no longer refers to a live element
    #[error("Element {id} is no longer attached")]
    ElementGone {
        /// Handle id
        id: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Scenario configuration error
    #[error("Invalid scenario: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl SlotCheckError {
    /// Create a timeout error
    #[must_use]
    pub fn timeout(waited_for: impl Into<String>, ms: u64) -> Self {
        Self::Timeout {
            waited_for: waited_for.into(),
            ms,
        }
    }

    /// Create a script error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this is a bounded-wait timeout rather than some other fault
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = SlotCheckError::timeout("button.w-full", 10_000);
        assert_eq!(
            err.to_string(),
            "Timed out after 10000ms waiting for button.w-full"
        );
        assert!(err.is_timeout());
    }

    #[test]
    fn test_other_faults_are_not_timeouts() {
        assert!(!SlotCheckError::script("boom").is_timeout());
        assert!(!SlotCheckError::config("bad").is_timeout());

        let io: SlotCheckError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(!io.is_timeout());
        assert!(io.to_string().contains("I/O"));
    }

    #[test]
    fn test_navigation_display() {
        let err = SlotCheckError::Navigation {
            url: "http://localhost:3002/".to_string(),
            message: "net::ERR_CONNECTION_REFUSED".to_string(),
        };
        assert!(err.to_string().contains("localhost:3002"));
        assert!(err.to_string().contains("ERR_CONNECTION_REFUSED"));
    }
}
