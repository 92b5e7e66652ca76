//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, Report};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("strict mode: {count} diagnostic(s) reported")]
    Strict { count: usize, report: Report },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn strict(report: Report) -> Self {
        Self::Strict {
            count: report.len(),
            report,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
