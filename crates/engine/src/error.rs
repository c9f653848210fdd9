//! Errors surfaced by the collaborator stores.
//!
//! The triage flow treats both variants that can occur on a resolution path
//! as non-fatal: a [`Persistence`] failure is logged and the queue still
//! advances, and a [`DuplicateRule`] conflict is swallowed entirely.
//!
//! [`Persistence`]: StoreError::Persistence
//! [`DuplicateRule`]: StoreError::DuplicateRule
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by the hosted store behind the collaborator traits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("a rule with pattern \"{0}\" already exists")]
    DuplicateRule(String),
    #[error("\"{0}\" not found")]
    NotFound(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}
