//! Configuration management for Turnstile.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use gatehouse_common::constants::{
    DEFAULT_ARTIFACT_NAME, DEFAULT_ARTIFACT_PATH, DEFAULT_LISTEN_ADDR,
    DEFAULT_MAX_VERIFY_ATTEMPTS, DEFAULT_OTP_EXPIRY_SECS, DEFAULT_OTP_LENGTH,
    DEFAULT_REQUEST_LIMIT, DEFAULT_SESSION_TTL_SECS, DEFAULT_SMTP_PORT, MAX_OTP_LENGTH,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// OTP lifecycle policy
    #[serde(default)]
    pub otp: OtpConfig,

    /// Session / access-gate settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Outbound mail settings
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Artifact served to verified sessions
    #[serde(default)]
    pub artifact: ArtifactConfig,
}

/// OTP policy knobs
#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    /// Decimal digits per code
    #[serde(default = "default_otp_length")]
    pub length: usize,

    /// Code validity in seconds
    #[serde(default = "default_otp_expiry")]
    pub expiry_secs: u64,

    /// Issuances per address while its record lives
    #[serde(default = "default_request_limit")]
    pub request_limit: u32,

    /// Wrong submissions before a code is invalidated
    #[serde(default = "default_max_attempts")]
    pub max_verify_attempts: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            length: default_otp_length(),
            expiry_secs: default_otp_expiry(),
            request_limit: default_request_limit(),
            max_verify_attempts: default_max_attempts(),
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session validity in seconds
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
        }
    }
}

/// Outbound mail settings
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// SMTP relay host
    #[serde(default)]
    pub host: String,

    /// Submission port (STARTTLS)
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// From address on outgoing mail; falls back to the username
    #[serde(default)]
    pub from: String,

    #[serde(default = "default_subject")]
    pub subject: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: String::new(),
            subject: default_subject(),
        }
    }
}

/// Artifact settings
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    /// Path of the file served after verification
    #[serde(default = "default_artifact_path")]
    pub path: String,

    /// File name presented in the Content-Disposition header
    #[serde(default = "default_artifact_name")]
    pub file_name: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            path: default_artifact_path(),
            file_name: default_artifact_name(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_otp_length() -> usize { DEFAULT_OTP_LENGTH }
fn default_otp_expiry() -> u64 { DEFAULT_OTP_EXPIRY_SECS }
fn default_request_limit() -> u32 { DEFAULT_REQUEST_LIMIT }
fn default_max_attempts() -> u32 { DEFAULT_MAX_VERIFY_ATTEMPTS }
fn default_session_ttl() -> u64 { DEFAULT_SESSION_TTL_SECS }
fn default_smtp_port() -> u16 { DEFAULT_SMTP_PORT }
fn default_subject() -> String { "Your one-time password for download access".to_string() }
fn default_artifact_path() -> String { DEFAULT_ARTIFACT_PATH.to_string() }
fn default_artifact_name() -> String { DEFAULT_ARTIFACT_NAME.to_string() }

impl AppConfig {
    /// Load configuration from file and environment, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut builder = config::Config::builder();
        if Path::new(config_path).exists() {
            builder = builder.add_source(config::File::with_name(config_path));
        } else {
            tracing::warn!("Config file not found, using defaults and environment");
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("GATEHOUSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        let mut config: Self = settings
            .try_deserialize()
            .context("Failed to parse config")?;

        // Apply CLI overrides
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref host) = args.smtp_host {
            config.smtp.host = host.clone();
        }
        if config.smtp.from.is_empty() {
            config.smtp.from = config.smtp.username.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    ///
    /// A bad code length is a startup fault, never a per-request one.
    pub fn validate(&self) -> Result<()> {
        if self.otp.length == 0 || self.otp.length > MAX_OTP_LENGTH {
            anyhow::bail!("otp.length must be between 1 and {MAX_OTP_LENGTH}");
        }
        if self.otp.expiry_secs == 0 {
            anyhow::bail!("otp.expiry_secs must be positive");
        }
        if self.otp.request_limit == 0 {
            anyhow::bail!("otp.request_limit must be positive");
        }
        if self.otp.max_verify_attempts == 0 {
            anyhow::bail!("otp.max_verify_attempts must be positive");
        }
        if self.artifact.path.is_empty() {
            anyhow::bail!("artifact.path must not be empty");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            otp: OtpConfig::default(),
            session: SessionConfig::default(),
            smtp: SmtpConfig::default(),
            artifact: ArtifactConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_policy() {
        let config = AppConfig::default();
        assert_eq!(config.otp.length, 6);
        assert_eq!(config.otp.expiry_secs, 600);
        assert_eq!(config.otp.request_limit, 5);
        assert_eq!(config.otp.max_verify_attempts, 5);
        assert_eq!(config.smtp.port, 587);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_length_codes_are_a_startup_fault() {
        let mut config = AppConfig::default();
        config.otp.length = 0;
        assert!(config.validate().is_err());

        config.otp.length = MAX_OTP_LENGTH + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_budgets_are_rejected() {
        let mut config = AppConfig::default();
        config.otp.request_limit = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.otp.max_verify_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.otp.expiry_secs = 0;
        assert!(config.validate().is_err());
    }
}
