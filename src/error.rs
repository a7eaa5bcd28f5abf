//! Error types for a provisioning run
//!
//! Every external call failure aborts the run, so each collaborator gets
//! its own variant carrying the provider's message. Parameter store failures
//! are the one exception: they are absorbed by
//! [`resolve_parameter`](crate::config::resolve_parameter) and never reach
//! the caller of a run.

/// Result type alias for provisioning operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Listing brokers failed
    #[error("broker directory request failed: {0}")]
    Directory(String),

    /// Listing metrics failed
    #[error("metrics listing failed: {0}")]
    Metrics(String),

    /// Writing a dashboard failed
    #[error("failed to write dashboard {name}: {message}")]
    Dashboard { name: String, message: String },

    /// Creating or deleting an alarm failed
    #[error("failed to update alarm {name}: {message}")]
    Alarm { name: String, message: String },

    /// Reading a configuration parameter failed
    #[error("parameter {name} unavailable: {message}")]
    Parameter { name: String, message: String },

    /// Listing or changing notification subscriptions failed
    #[error("notification subscription request failed: {0}")]
    Notification(String),

    /// A dashboard template is missing a field the composer rewrites
    #[error("malformed dashboard template {template}: {message}")]
    Template { template: String, message: String },

    #[error("dashboard serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn template(template: impl ToString, message: impl ToString) -> Error {
        Error::Template {
            template: template.to_string(),
            message: message.to_string(),
        }
    }
}
