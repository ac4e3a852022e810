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
    Application(#[from] ApplicationError),

    #[error("{0}")]
    Usage(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(ApplicationError::Domain(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(InfraError::Io { .. }) => crate::exitcode::IOERR,
            CliError::Application(e) => application_exit_code(e),
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Config { .. } => crate::exitcode::CONFIG,
        ApplicationError::NoActiveDrag => crate::exitcode::USAGE,
        ApplicationError::OperationFailed { .. } => crate::exitcode::NOINPUT,
        ApplicationError::Domain(DomainError::NodeNotFound(_))
        | ApplicationError::Domain(DomainError::ParentNotFound(_)) => crate::exitcode::NOTFOUND,
        ApplicationError::Domain(_) => crate::exitcode::DATAERR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeId;

    #[test]
    fn given_layered_errors_when_mapping_then_exit_codes_follow_sysexits() {
        assert_eq!(
            CliError::Usage("x".into()).exit_code(),
            crate::exitcode::USAGE
        );
        assert_eq!(
            CliError::from(DomainError::DuplicateId(NodeId::new("1"))).exit_code(),
            crate::exitcode::DATAERR
        );
        assert_eq!(
            CliError::from(DomainError::ParentNotFound(NodeId::new("9"))).exit_code(),
            crate::exitcode::NOTFOUND
        );
        let config = ApplicationError::Config {
            message: "bad".into(),
        };
        assert_eq!(CliError::from(config).exit_code(), crate::exitcode::CONFIG);
        let closed = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let io = InfraError::io("write", closed);
        assert_eq!(CliError::Infra(io).exit_code(), crate::exitcode::IOERR);
    }
}
