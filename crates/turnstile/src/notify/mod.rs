//! Out-of-band code delivery.

mod smtp;

pub use smtp::SmtpNotifier;

use async_trait::async_trait;
use thiserror::Error;

/// Delivery failure reported back to the issuance flow.
///
/// The user never received the code, so the caller must roll the
/// freshly issued record back out of the store.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp transport failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Hands a freshly issued code to its recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(
        &self,
        email: &str,
        code: &str,
        expires_in_secs: u64,
    ) -> Result<(), DeliveryError>;
}
