use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::{Category, Code, Severity};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::{config::SmtpConfig, dto::OutgoingEmail};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("EMAIL_USER and EMAIL_PASS are not configured")]
    MissingCredentials,

    #[error("Sender address '{0}' is not a valid mailbox")]
    InvalidSender(String),

    #[error("Failed to build email message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Failed to connect to SMTP relay: {0}")]
    Relay(lettre::transport::smtp::Error),

    #[error("SMTP relay did not accept the connection")]
    Unreachable,

    #[error("SMTP authentication failed: {0}")]
    Auth(String),

    #[error("SMTP transport error: {0}")]
    Transport(lettre::transport::smtp::Error),
}

/// Delivers one message to all of its recipients in a single provider call.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    config: SmtpConfig,
}

/// 53x replies are the SMTP authentication class (530, 534, 535, ...).
fn is_auth_rejection(code: Code) -> bool {
    code.severity == Severity::PermanentNegativeCompletion && code.category == Category::Unspecified3
}

fn classify(e: lettre::transport::smtp::Error) -> MailError {
    if e.status().is_some_and(is_auth_rejection) {
        MailError::Auth(e.to_string())
    } else {
        MailError::Transport(e)
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn html_body(text: &str) -> String {
    format!(
        "<pre style=\"font-family: Arial, sans-serif; white-space: pre-wrap;\">{}</pre>",
        escape_html(text)
    )
}

fn build_message(from: Mailbox, email: &OutgoingEmail) -> Result<Message, MailError> {
    let mut builder = Message::builder().from(from).subject(email.subject.clone());
    for to in &email.recipients {
        builder = builder.to(to.clone());
    }

    let body = MultiPart::alternative_plain_html(email.body.clone(), html_body(&email.body));
    Ok(builder.multipart(body)?)
}

impl SmtpMailer {
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn credentials(&self) -> Result<(&str, &str), MailError> {
        match (self.config.username.as_deref(), self.config.password.as_deref()) {
            (Some(user), Some(pass)) => Ok((user, pass)),
            _ => Err(MailError::MissingCredentials),
        }
    }

    fn transport(
        &self,
        user: &str,
        pass: &str,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let creds = Credentials::new(user.to_string(), pass.to_string());

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.relay)
            .map_err(MailError::Relay)?
            .credentials(creds)
            .timeout(Some(self.config.timeout));

        if let Some(port) = self.config.port {
            builder = builder.port(port);
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let (user, pass) = self.credentials()?;
        let from: Mailbox = user
            .parse()
            .map_err(|_| MailError::InvalidSender(user.to_string()))?;

        let message = build_message(from, email)?;
        let mailer = self.transport(user, pass)?;

        if self.config.verify_before_send {
            tracing::debug!(relay = %self.config.relay, "Verifying SMTP transport");
            if !mailer.test_connection().await.map_err(classify)? {
                return Err(MailError::Unreachable);
            }
        }

        tracing::info!(
            recipients = email.recipients.len(),
            "Sending email with subject '{}'",
            email.subject
        );

        mailer.send(message).await.map_err(classify)?;

        tracing::info!(recipients = email.recipients.len(), "Email sent successfully");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettre::transport::smtp::response::Detail;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            recipients: vec![
                "a@example.com".parse().unwrap(),
                "b@example.com".parse().unwrap(),
            ],
            subject: "Hi".to_string(),
            body: "Body <text> & more".to_string(),
        }
    }

    #[test]
    fn html_part_escapes_markup() {
        assert_eq!(
            html_body("1 < 2 & \"x\""),
            "<pre style=\"font-family: Arial, sans-serif; white-space: pre-wrap;\">\
             1 &lt; 2 &amp; &quot;x&quot;</pre>"
        );
    }

    #[test]
    fn message_carries_both_parts_and_all_recipients() {
        let from: Mailbox = "sender@example.com".parse().unwrap();
        let message = build_message(from, &email()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("To: a@example.com, b@example.com"));
        assert!(raw.contains("Subject: Hi"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("Body <text> & more"));
    }

    #[test]
    fn auth_replies_are_recognised() {
        let bad_creds = Code::new(
            Severity::PermanentNegativeCompletion,
            Category::Unspecified3,
            Detail::Five,
        );
        let mailbox_full = Code::new(
            Severity::PermanentNegativeCompletion,
            Category::MailSystem,
            Detail::Two,
        );
        let temporary = Code::new(
            Severity::TransientNegativeCompletion,
            Category::Unspecified3,
            Detail::Four,
        );

        assert!(is_auth_rejection(bad_creds));
        assert!(!is_auth_rejection(mailbox_full));
        assert!(!is_auth_rejection(temporary));
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_connecting() {
        let mailer = SmtpMailer::new(SmtpConfig {
            username: Some("sender@example.com".to_string()),
            password: None,
            relay: "127.0.0.1".to_string(),
            ..SmtpConfig::default()
        });

        let err = mailer.send(&email()).await.unwrap_err();
        assert!(matches!(err, MailError::MissingCredentials));
    }

    #[tokio::test]
    async fn invalid_sender_fails_before_connecting() {
        let mailer = SmtpMailer::new(SmtpConfig {
            username: Some("not an address".to_string()),
            password: Some("secret".to_string()),
            relay: "127.0.0.1".to_string(),
            ..SmtpConfig::default()
        });

        let err = mailer.send(&email()).await.unwrap_err();
        assert!(matches!(err, MailError::InvalidSender(_)));
    }
}
