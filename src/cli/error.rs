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

    #[error("{0}")]
    Usage(String),
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
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Parse { .. } => crate::exitcode::DATAERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(DomainError::NodeLocation { .. }) => {
                        crate::exitcode::USAGE
                    }
                    ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                    ApplicationError::InvalidArgument(_) | ApplicationError::UnknownNode(_) => {
                        crate::exitcode::USAGE
                    }
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::NOINPUT,
                    ApplicationError::StaleElement(_) => crate::exitcode::SOFTWARE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_missing_label_error_when_mapping_exit_code_then_data_error() {
        let err: CliError =
            ApplicationError::from(DomainError::MissingLabelAndValue { path: vec![0] }).into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_bad_location_when_mapping_exit_code_then_usage() {
        let err: CliError =
            ApplicationError::from(DomainError::NodeLocation { path: vec![9] }).into();
        assert_eq!(err.exit_code(), crate::exitcode::USAGE);
        assert_eq!(err.to_string(), "[9] is not a valid node location");
    }
}
