use anyhow::Result;
use interfaces::defs::{NewRelevantItem, Notifier};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

use crate::notification::{compose_body, compose_subject};

pub const ENV_RECIPIENT: &str = "NOTIFY_EMAIL_TO";
pub const ENV_SENDER: &str = "NOTIFY_EMAIL_FROM";
pub const ENV_HOST: &str = "SMTP_HOST";
pub const ENV_PORT: &str = "SMTP_PORT";
pub const ENV_USERNAME: &str = "SMTP_USERNAME";
pub const ENV_PASSWORD: &str = "SMTP_PASSWORD";

#[derive(Clone)]
pub struct SmtpConfig {
    pub recipient: String,
    pub sender: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("recipient", &self.recipient)
            .field("sender", &self.sender)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl SmtpConfig {
    /// Read the SMTP settings from the process environment.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the settings from any key lookup.
    ///
    /// Returns `None` (notification disabled) when the recipient, host,
    /// port, username or password is missing, blank or unparsable. The
    /// sender defaults to the username.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let missing: Vec<&str> = [ENV_RECIPIENT, ENV_HOST, ENV_PORT, ENV_USERNAME, ENV_PASSWORD]
            .into_iter()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            info!(stage = "notify", missing = ?missing, "SMTP settings incomplete, email notification disabled");
            return None;
        }

        let port_raw = get(ENV_PORT)?;
        let port = match port_raw.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                info!(stage = "notify", port = %port_raw, "Invalid SMTP port, email notification disabled");
                return None;
            }
        };

        let username = get(ENV_USERNAME)?;
        Some(Self {
            recipient: get(ENV_RECIPIENT)?,
            sender: get(ENV_SENDER).unwrap_or_else(|| username.clone()),
            host: get(ENV_HOST)?,
            port,
            username,
            password: get(ENV_PASSWORD)?,
        })
    }
}

/// Sends one multipart plain-text email per batch over SMTP with STARTTLS.
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Build the message without sending it.
    pub fn build_message(&self, items: &[NewRelevantItem]) -> Result<Message> {
        let from: Mailbox = self.config.sender.parse()?;
        let to: Mailbox = self.config.recipient.parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(compose_subject(items))
            .multipart(MultiPart::mixed().singlepart(SinglePart::plain(compose_body(items))))?;
        Ok(message)
    }
}

impl Notifier for SmtpNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    fn notify(&self, items: &[NewRelevantItem]) -> Result<()> {
        let message = self.build_message(items)?;

        debug!(
            stage = "notify",
            host = %self.config.host,
            port = self.config.port,
            recipient = %self.config.recipient,
            "Connecting to SMTP relay"
        );
        let mailer = SmtpTransport::starttls_relay(&self.config.host)?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build();

        mailer
            .send(&message)
            .map_err(|e| anyhow::anyhow!("Failed to send email via SMTP: {}", e))?;

        info!(stage = "notify", recipient = %self.config.recipient, items = items.len(), "Email sent");
        Ok(())
    }
}
