use anyhow::{Context, Result};
use storage::services::notifier::MailNotifier;
use storage::services::replacement::ReplacementMode;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
    pub replacement_mode: ReplacementMode,
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let replacement_mode = ReplacementMode::parse(
            &std::env::var("REPLACEMENT_MODE").unwrap_or_else(|_| "strict".into()),
        )?;

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(server) => Some(SmtpConfig {
                server,
                port: std::env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".into())
                    .parse()
                    .context("SMTP_PORT must be a number")?,
                username: std::env::var("SMTP_USERNAME")
                    .context("Cannot load SMTP_USERNAME env variable")?,
                password: std::env::var("SMTP_PASSWORD")
                    .context("Cannot load SMTP_PASSWORD env variable")?,
                from: std::env::var("SMTP_FROM").context("Cannot load SMTP_FROM env variable")?,
            }),
            Err(_) => None,
        };

        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            replacement_mode,
            smtp,
        })
    }

    pub fn mail_notifier(&self) -> Result<MailNotifier> {
        match &self.smtp {
            Some(smtp) => Ok(MailNotifier::smtp(
                &smtp.server,
                smtp.port,
                smtp.username.clone(),
                smtp.password.clone(),
                smtp.from.clone(),
            )?),
            None => Ok(MailNotifier::disabled()),
        }
    }
}
