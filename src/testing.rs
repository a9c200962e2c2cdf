//! Recording stand-ins for the completion and mail adapters.

use async_trait::async_trait;

use std::sync::Mutex;

use crate::{
    completion::{CompletionClient, CompletionError},
    config::CredentialPresence,
    dto::OutgoingEmail,
    mailer::{MailError, Mailer},
};

pub const fn presence(groq_api_key: bool, email_user: bool, email_pass: bool) -> CredentialPresence {
    CredentialPresence {
        groq_api_key,
        email_user,
        email_pass,
    }
}

pub struct MockCompletion {
    outcome: Box<dyn Fn() -> Result<String, CompletionError> + Send + Sync>,
    prompts: Mutex<Vec<String>>,
}

impl MockCompletion {
    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self {
            outcome: Box::new(move || Ok(text.clone())),
            prompts: Mutex::default(),
        }
    }

    pub fn failing(err: impl Fn() -> CompletionError + Send + Sync + 'static) -> Self {
        Self {
            outcome: Box::new(move || Err(err())),
            prompts: Mutex::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.outcome)()
    }
}

pub struct MockMailer {
    outcome: Box<dyn Fn() -> Result<(), MailError> + Send + Sync>,
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl MockMailer {
    pub fn accepting() -> Self {
        Self {
            outcome: Box::new(|| Ok(())),
            sent: Mutex::default(),
        }
    }

    pub fn failing(err: impl Fn() -> MailError + Send + Sync + 'static) -> Self {
        Self {
            outcome: Box::new(move || Err(err())),
            sent: Mutex::default(),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        (self.outcome)()
    }
}
