// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Hubcast directory bot.

use thiserror::Error;

/// The primary error type used across all Hubcast trait seams and core operations.
///
/// Every public operation returns `Result<_, HubcastError>`; no internal fault
/// is allowed to escape as a panic.
#[derive(Debug, Error)]
pub enum HubcastError {
    /// Malformed user input. The message is a formatted, user-correctable
    /// usage hint ready to be sent back verbatim.
    #[error("validation error: {0}")]
    Validation(String),

    /// A unique key (channel handle) already exists. `category` names where
    /// the existing entry lives (a directory category, or the target list).
    #[error("channel @{handle} is already registered in {category}")]
    Duplicate { handle: String, category: String },

    /// The acting user is not authorized for the operation.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Unknown identity, possibly already processed.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport-level failure scoped to one target. Recorded per-target
    /// during a distribution run; never aborts the run.
    #[error("delivery to {target} failed: {message}")]
    Delivery {
        target: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HubcastError {
    /// Shorthand for a [`HubcastError::Storage`] wrapping any error source.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// Shorthand for a [`HubcastError::Delivery`] without an underlying source.
    pub fn delivery(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delivery {
            target: target.into(),
            message: message.into(),
            source: None,
        }
    }
}

/// Convenience result alias used throughout the workspace.
pub type HubcastResult<T> = Result<T, HubcastError>;
