//! Application state and shared resources.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::notify::{Notifier, SmtpNotifier};
use crate::otp::{OtpGenerator, OtpStore, OtpVerifier};
use crate::session::SessionGate;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// OTP record store, sole owner of challenge state
    pub store: Arc<OtpStore>,

    /// Code generator
    pub generator: Arc<OtpGenerator>,

    /// Submission verifier
    pub verifier: Arc<OtpVerifier>,

    /// Session / access gate
    pub sessions: Arc<SessionGate>,

    /// Out-of-band code delivery
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Create new application state with the SMTP notifier.
    pub fn new(config: AppConfig) -> Result<Self> {
        let notifier = Arc::new(
            SmtpNotifier::new(&config.smtp).context("Failed to build SMTP transport")?,
        );
        Self::with_notifier(config, notifier)
    }

    /// Same, with a caller-supplied notifier. Tests plug in here.
    pub fn with_notifier(config: AppConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let store = Arc::new(OtpStore::new(
            config.otp.request_limit,
            config.otp.max_verify_attempts,
        ));
        let generator = Arc::new(OtpGenerator::new(config.otp.length));
        let verifier = Arc::new(OtpVerifier::new(store.clone()));
        let sessions = Arc::new(SessionGate::new(config.session.ttl_secs));

        Ok(Self {
            config,
            store,
            generator,
            verifier,
            sessions,
            notifier,
        })
    }
}
