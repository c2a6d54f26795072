//! Error type definitions for the profile preview pipeline
//!
//! This module defines all error types used throughout the crate,
//! providing a hierarchical error system that makes debugging and error
//! handling more straightforward.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can surface from the
/// pipeline. It uses `thiserror` to provide automatic error trait
/// implementations and proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Form validation failures, one entry per offending field
    #[error("Validation failed: {fields:?}")]
    Validation { fields: Vec<FieldError> },

    /// Permission denied errors
    #[error("Permission denied: {action} on {resource}")]
    PermissionDenied { action: String, resource: String },

    /// Errors from external collaborators (profile store, sample query)
    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    /// Preview channel transport errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// A single invalid form field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Preview channel transport specific errors
///
/// The transport itself (socket, reconnection, backoff) is owned by the
/// host; these are the failures it may report on a single send.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The shared connection is not currently established
    #[error("Channel not connected")]
    NotConnected,

    /// The send itself failed
    #[error("Send failed: {message}")]
    SendFailed { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error from a list of field errors
    pub fn validation(fields: Vec<FieldError>) -> Self {
        Self::Validation { fields }
    }

    /// Create a permission denied error
    pub fn permission_denied<A: Into<String>, R: Into<String>>(action: A, resource: R) -> Self {
        Self::PermissionDenied {
            action: action.into(),
            resource: resource.into(),
        }
    }

    /// Create an external service error
    pub fn external_service<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Fields that failed validation, if this is a validation error
    pub fn validation_fields(&self) -> Option<&[FieldError]> {
        match self {
            Self::Validation { fields } => Some(fields),
            _ => None,
        }
    }
}

impl FieldError {
    /// Create a required-field error
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            message: "is required".to_string(),
        }
    }
}

impl TransportError {
    /// Create a send failed error
    pub fn send_failed<M: Into<String>>(message: M) -> Self {
        Self::SendFailed {
            message: message.into(),
        }
    }
}
