use serde::{Deserialize, Serialize};

use std::{
    env,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("Invalid environment variable: {0}")]
    Env(#[from] envy::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub static_dir: PathBuf,
    pub cors_origins: Vec<String>,
    pub completion: CompletionConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: Option<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub relay: String,
    pub port: Option<u16>,
    pub verify_before_send: bool,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

/// Which credentials were supplied, as reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialPresence {
    pub groq_api_key: bool,
    pub email_user: bool,
    pub email_pass: bool,
}

/// Variables read from the process environment. They win over the config file.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    groq_api_key: Option<String>,
    email_user: Option<String>,
    email_pass: Option<String>,
    port: Option<u16>,
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional email writer. Create clear, concise, \
and well-structured emails based on the user's request. Only return the email content without any \
additional formatting or explanations.";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            static_dir: PathBuf::from("public"),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5000".to_string(),
                "http://127.0.0.1:5500".to_string(),
                "*".to_string(),
            ],
            completion: CompletionConfig::default(),
            smtp: SmtpConfig::default(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-8b-8192".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            relay: "smtp.gmail.com".to_string(),
            port: None,
            verify_before_send: true,
            timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_yaml_str(contents: &str, path: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    fn with_env(mut self, overrides: EnvOverrides) -> Self {
        if let Some(key) = non_empty(overrides.groq_api_key) {
            self.completion.api_key = Some(key);
        }
        if let Some(user) = non_empty(overrides.email_user) {
            self.smtp.username = Some(user);
        }
        if let Some(pass) = non_empty(overrides.email_pass) {
            self.smtp.password = Some(pass);
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }

        // Blank values from the file count as missing too
        self.completion.api_key = non_empty(self.completion.api_key.take());
        self.smtp.username = non_empty(self.smtp.username.take());
        self.smtp.password = non_empty(self.smtp.password.take());
        self
    }

    pub const fn presence(&self) -> CredentialPresence {
        CredentialPresence {
            groq_api_key: self.completion.api_key.is_some(),
            email_user: self.smtp.username.is_some(),
            email_pass: self.smtp.password.is_some(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn read_file(path: &Path) -> Result<Config, ConfigError> {
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    Config::from_yaml_str(&contents, &display)
}

fn load_file() -> Result<Config, ConfigError> {
    // Retrieve env variable
    let config_path =
        env::var("EMAIL_SENDER_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return read_file(Path::new(&config_path));
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return read_file(Path::new("config.yaml"));
    }

    // Fallback to built-in defaults
    tracing::info!("No config file found, using defaults and environment variables");
    Ok(Config::default())
}

fn load_from_iter<I>(base: Config, vars: I) -> Result<Config, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let overrides: EnvOverrides = envy::from_iter(vars)?;
    Ok(base.with_env(overrides))
}

/// Drops variables whose name or value is not valid Unicode; none of ours can be.
fn unicode_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
}

/// Builds the process-wide configuration: `.env`, then the YAML file, then the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::info!("Loaded environment from {}", path.display());
    }

    let base = load_file()?;
    load_from_iter(base, unicode_vars(env::vars_os()))
}
