//! Domain-level errors
//!
//! Restructuring itself never fails; the only hard error is JSON text that
//! cannot be parsed at all.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid schema JSON: {0}")]
    Json(#[source] serde_json::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
