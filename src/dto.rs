use lettre::message::{Mailbox, Mailboxes};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ServiceError;

pub const PROMPT_REQUIRED: &str = "Prompt is required";
pub const FIELDS_REQUIRED: &str = "All fields are required";

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GenerateEmailRequest {
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerateEmailResponse {
    pub email: String,
}

/// Either a single (possibly comma-separated) address or a list of addresses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub recipients: Option<Recipients>,
    pub subject: Option<String>,
    pub email_body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SendEmailResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvStatus {
    pub groq_api_key: bool,
    pub email_user: bool,
    pub email_pass: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub env: EnvStatus,
}

/// A send request that passed validation, ready for the mail adapter.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub recipients: Vec<Mailbox>,
    pub subject: String,
    pub body: String,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Recipients {
    /// `Ok(None)` when no address was given at all.
    fn mailboxes(&self) -> Result<Option<Vec<Mailbox>>, ServiceError> {
        let invalid = |a: &str| ServiceError::Validation(format!("Invalid recipient address: {a}"));

        let mailboxes: Vec<Mailbox> = match self {
            Self::One(list) if list.trim().is_empty() => Vec::new(),
            Self::One(list) => list
                .parse::<Mailboxes>()
                .map_err(|_| invalid(list.trim()))?
                .into_iter()
                .collect(),
            Self::Many(items) => items
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .map(|a| a.parse::<Mailbox>().map_err(|_| invalid(a)))
                .collect::<Result<_, _>>()?,
        };

        Ok(Some(mailboxes).filter(|m| !m.is_empty()))
    }
}

impl GenerateEmailRequest {
    pub fn validate(self) -> Result<String, ServiceError> {
        present(self.prompt).ok_or_else(|| ServiceError::Validation(PROMPT_REQUIRED.to_string()))
    }
}

impl SendEmailRequest {
    pub fn validate(self) -> Result<OutgoingEmail, ServiceError> {
        let missing = || ServiceError::Validation(FIELDS_REQUIRED.to_string());

        let recipients = self.recipients.ok_or_else(missing)?;
        let subject = present(self.subject).ok_or_else(missing)?;
        let body = present(self.email_body).ok_or_else(missing)?;

        let recipients = recipients.mailboxes()?.ok_or_else(missing)?;

        Ok(OutgoingEmail {
            recipients,
            subject,
            body,
        })
    }
}
