use crate::{completion::CompletionError, mailer::MailError};

/// Outcome classes shared by both endpoints. Handlers pick the HTTP status from the variant.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error("Upstream rejected credentials: {0}")]
    Auth(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl From<CompletionError> for ServiceError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::MissingApiKey => Self::Configuration(e.to_string()),
            CompletionError::Client(_)
            | CompletionError::Transport(_)
            | CompletionError::Status { .. }
            | CompletionError::EmptyCompletion => Self::Upstream(e.to_string()),
        }
    }
}

impl From<MailError> for ServiceError {
    fn from(e: MailError) -> Self {
        match e {
            MailError::MissingCredentials | MailError::InvalidSender(_) => {
                Self::Configuration(e.to_string())
            }
            MailError::Auth(_) => Self::Auth(e.to_string()),
            MailError::MessageBuild(_)
            | MailError::Relay(_)
            | MailError::Unreachable
            | MailError::Transport(_) => Self::Upstream(e.to_string()),
        }
    }
}
