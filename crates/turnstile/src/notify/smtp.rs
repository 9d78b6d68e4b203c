//! SMTP delivery via lettre.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

use super::{DeliveryError, Notifier};

/// Production notifier: one plain-text mail per issued code.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    subject: String,
}

impl SmtpNotifier {
    /// Build a STARTTLS submission transport from config.
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from: config.from.clone(),
            subject: config.subject.clone(),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn deliver(
        &self,
        email: &str,
        code: &str,
        expires_in_secs: u64,
    ) -> Result<(), DeliveryError> {
        let body = format!(
            "Your one-time password for the download is: {code}\n\n\
             This code expires in {} minutes.\n\n\
             If you did not request this, ignore this email.",
            expires_in_secs.div_ceil(60),
        );

        let message = Message::builder()
            .from(self.from.parse()?)
            .to(email.parse()?)
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(message).await?;
        tracing::info!(email = %email, "code dispatched");
        Ok(())
    }
}
