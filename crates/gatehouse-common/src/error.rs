//! Common error types for Gatehouse components.

use thiserror::Error;

/// Common errors across Gatehouse components
#[derive(Debug, Error)]
pub enum GatehouseError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Too many codes issued for one address
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Session missing, expired, or short of a required step
    #[error("Session error: {0}")]
    Session(String),

    /// Outbound mail failure
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Invalid input/request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatehouseError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::RateLimited(_) => 429,
            Self::Session(_) => 401,
            Self::Delivery(_) => 502,
            Self::InvalidInput(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Returns true if retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Delivery(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_onto_http() {
        assert_eq!(GatehouseError::RateLimited(String::new()).status_code(), 429);
        assert_eq!(GatehouseError::Session(String::new()).status_code(), 401);
        assert_eq!(GatehouseError::Delivery(String::new()).status_code(), 502);
        assert_eq!(GatehouseError::InvalidInput(String::new()).status_code(), 400);
    }

    #[test]
    fn only_delivery_is_retryable() {
        assert!(GatehouseError::Delivery("smtp down".into()).is_retryable());
        assert!(!GatehouseError::RateLimited("limit".into()).is_retryable());
        assert!(!GatehouseError::Session("gone".into()).is_retryable());
    }
}
