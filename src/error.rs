//! Error types for quarry.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Main error type for quarry operations.
#[derive(Error, Debug)]
pub enum QuarryError {
    /// Kerberos ticket precondition failed; no connection was attempted.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Could not establish or maintain the HTTP session to the engine.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The engine rejected a specific statement in the sequence.
    #[error("Execution error in statement {index} ({sql}): {message}")]
    Execution {
        /// Zero-based position of the failing statement.
        index: usize,
        /// The SQL text that failed.
        sql: String,
        /// The engine's failure message.
        message: String,
    },

    /// A temporal-tagged column held a value that could not be parsed.
    #[error("Coercion error: {0}")]
    Coercion(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (caller misuse, unexpected states).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuarryError {
    /// Creates an authentication error with the given message.
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an execution error for the statement at `index`.
    pub fn execution(index: usize, sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            index,
            sql: sql.into(),
            message: message.into(),
        }
    }

    /// Creates a coercion error with the given message.
    pub fn coercion(msg: impl Into<String>) -> Self {
        Self::Coercion(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "Authentication Error",
            Self::Connection(_) => "Connection Error",
            Self::Execution { .. } => "Execution Error",
            Self::Coercion(_) => "Coercion Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using QuarryError.
pub type Result<T> = std::result::Result<T, QuarryError>;
