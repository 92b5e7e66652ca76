//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{count} diagnostic(s) reported")]
    Diagnostics { count: usize },
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Diagnostics { .. } => crate::exitcode::DATAERR,
            CliError::Infra(InfraError::Application(app)) => match app {
                ApplicationError::Domain(DomainError::Json(_)) => crate::exitcode::DATAERR,
                ApplicationError::Strict { .. } => crate::exitcode::DATAERR,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Report;

    #[test]
    fn given_strict_failure_when_mapping_then_data_error() {
        let err: CliError = ApplicationError::strict(Report::new()).into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_config_failure_when_mapping_then_config_code() {
        let err: CliError = ApplicationError::Config {
            message: "bad".into(),
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::CONFIG);
    }

    #[test]
    fn given_diagnostics_when_mapping_then_data_error() {
        assert_eq!(
            CliError::Diagnostics { count: 2 }.exit_code(),
            crate::exitcode::DATAERR
        );
    }
}
