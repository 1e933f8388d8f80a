//! Errors reported when waiting for a promise.
//!
//! Domain failures travel through the promise's own error type `E`; this
//! module only adds the outcome a waiter can see but a callback cannot:
//! the promise was cancelled and will never produce a result.

use thiserror::Error;

/// Why waiting for a promise did not produce a success value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromiseError<E> {
    /// The promise was cancelled before it completed.
    #[error("promise was cancelled before it completed")]
    Cancelled,

    /// The promise completed with an error.
    #[error("promise was rejected")]
    Rejected(E),
}

impl<E> PromiseError<E> {
    /// Returns `true` if the promise was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PromiseError::Cancelled)
    }

    /// Returns the rejection error, if the promise was rejected.
    pub fn into_rejection(self) -> Option<E> {
        match self {
            PromiseError::Rejected(error) => Some(error),
            PromiseError::Cancelled => None,
        }
    }
}
