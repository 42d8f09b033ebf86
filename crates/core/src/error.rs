//! # Error Types
//!
//! Errors in the comfort model are contract violations: asking about a group
//! that has no profile, or building a profile whose parameters cannot describe
//! a real preference. Neither is recoverable at this layer.

use thiserror::Error;

/// Core errors for the thermal comfort model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// No preference profile is registered under this label.
    #[error("Unknown occupant group: {label}")]
    UnknownGroup { label: String },

    /// Profile parameters are inconsistent.
    #[error("Invalid preference profile for {label}: {reason}")]
    InvalidProfile { label: String, reason: String },
}
