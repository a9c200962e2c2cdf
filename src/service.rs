use chrono::{SecondsFormat, Utc};

use std::sync::Arc;

use crate::{
    completion::CompletionClient,
    config::CredentialPresence,
    dto::{
        EnvStatus, GenerateEmailRequest, GenerateEmailResponse, HealthResponse, SendEmailRequest,
        SendEmailResponse,
    },
    error::ServiceError,
    mailer::Mailer,
};

pub const SEND_SUCCESS: &str = "Email sent successfully!";

pub struct EmailService {
    completion: Arc<dyn CompletionClient>,
    mailer: Arc<dyn Mailer>,
    presence: CredentialPresence,
}

impl EmailService {
    pub const fn new(
        completion: Arc<dyn CompletionClient>,
        mailer: Arc<dyn Mailer>,
        presence: CredentialPresence,
    ) -> Self {
        Self {
            completion,
            mailer,
            presence,
        }
    }

    pub async fn generate_email(
        &self,
        request: GenerateEmailRequest,
    ) -> Result<GenerateEmailResponse, ServiceError> {
        let prompt = request.validate()?;

        tracing::debug!(
            "Generating email for prompt '{}'",
            prompt.chars().take(80).collect::<String>()
        );

        let email = self.completion.complete(&prompt).await?;

        Ok(GenerateEmailResponse { email })
    }

    pub async fn send_email(
        &self,
        request: SendEmailRequest,
    ) -> Result<SendEmailResponse, ServiceError> {
        let email = request.validate()?;

        self.mailer.send(&email).await?;

        Ok(SendEmailResponse {
            message: SEND_SUCCESS.to_string(),
        })
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "OK".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            env: EnvStatus {
                groq_api_key: self.presence.groq_api_key,
                email_user: self.presence.email_user,
                email_pass: self.presence.email_pass,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        completion::CompletionError,
        mailer::MailError,
        testing::{MockCompletion, MockMailer, presence},
    };

    fn service(completion: &Arc<MockCompletion>, mailer: &Arc<MockMailer>) -> EmailService {
        EmailService::new(completion.clone(), mailer.clone(), presence(true, true, true))
    }

    #[tokio::test]
    async fn generate_passes_prompt_through() {
        let completion = Arc::new(MockCompletion::replying("Dear ..."));
        let mailer = Arc::new(MockMailer::accepting());

        let resp = service(&completion, &mailer)
            .generate_email(GenerateEmailRequest {
                prompt: Some("thank a colleague for help on a project".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(resp.email, "Dear ...");
        assert_eq!(
            completion.prompts(),
            vec!["thank a colleague for help on a project"]
        );
    }

    #[tokio::test]
    async fn invalid_requests_never_reach_adapters() {
        let completion = Arc::new(MockCompletion::replying("unused"));
        let mailer = Arc::new(MockMailer::accepting());
        let svc = service(&completion, &mailer);

        let gen_err = svc
            .generate_email(GenerateEmailRequest::default())
            .await
            .unwrap_err();
        let send_err = svc
            .send_email(SendEmailRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(gen_err, ServiceError::Validation(_)));
        assert!(matches!(send_err, ServiceError::Validation(_)));
        assert!(completion.prompts().is_empty());
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn adapter_errors_keep_their_class() {
        let completion = Arc::new(MockCompletion::failing(|| CompletionError::MissingApiKey));
        let mailer = Arc::new(MockMailer::failing(|| MailError::Unreachable));
        let svc = service(&completion, &mailer);

        let gen_err = svc
            .generate_email(GenerateEmailRequest {
                prompt: Some("hi".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(gen_err, ServiceError::Configuration(_)));

        let send_err = svc
            .send_email(SendEmailRequest {
                recipients: Some(crate::dto::Recipients::One("a@example.com".to_string())),
                subject: Some("Hi".to_string()),
                email_body: Some("Body text".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(send_err, ServiceError::Upstream(_)));
        assert_eq!(mailer.sent().len(), 1);
    }

    #[test]
    fn health_reflects_presence() {
        let svc = EmailService::new(
            Arc::new(MockCompletion::replying("")),
            Arc::new(MockMailer::accepting()),
            presence(true, false, true),
        );

        let health = svc.health();
        assert_eq!(health.status, "OK");
        assert!(health.env.groq_api_key);
        assert!(!health.env.email_user);
        assert!(health.env.email_pass);
        assert!(chrono::DateTime::parse_from_rfc3339(&health.timestamp).is_ok());
    }
}
