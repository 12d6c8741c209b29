//! Error types for routesyncd
//!
//! Only real failures live here. An "already exists" reply from the kernel and
//! an unmatched bridge are outcomes, not errors, and are modelled by
//! [`crate::types::AddRouteOutcome`] and [`crate::resolver::Resolution`].

use thiserror::Error;

/// Errors that can occur in routesyncd
#[derive(Debug, Error)]
pub enum RoutesyncError {
    /// Netlink request or socket operation failed
    #[error("Netlink operation failed: {operation}: {message}")]
    Netlink {
        /// The operation that failed (e.g. "add route", "dump links")
        operation: String,
        /// Error message
        message: String,
    },

    /// Interface lookup by index failed
    #[error("Interface not found: index {0}")]
    InterfaceNotFound(u32),

    /// Interface lookup by name failed
    #[error("Interface not found: {0}")]
    LinkNotFound(String),

    /// Network registry (container runtime) unreachable or returned garbage
    #[error("Network registry error: {0}")]
    Registry(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The kernel route event stream ended without a shutdown request
    #[error("Route event subscription closed unexpectedly")]
    SubscriptionClosed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RoutesyncError {
    /// Creates a netlink error.
    pub fn netlink(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::Netlink {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Creates a registry error.
    pub fn registry(message: impl ToString) -> Self {
        Self::Registry(message.to_string())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for routesyncd operations
pub type Result<T> = std::result::Result<T, RoutesyncError>;
