//! Shared constants for Gatehouse components.

/// Default Turnstile HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Default code length (decimal digits)
pub const DEFAULT_OTP_LENGTH: usize = 6;

/// Widest code the generator accepts
pub const MAX_OTP_LENGTH: usize = 10;

/// Default code validity (10 minutes)
pub const DEFAULT_OTP_EXPIRY_SECS: u64 = 600;

/// Issuances allowed per address while its record lives
pub const DEFAULT_REQUEST_LIMIT: u32 = 5;

/// Wrong submissions allowed before a code is invalidated
pub const DEFAULT_MAX_VERIFY_ATTEMPTS: u32 = 5;

/// Session validity (1 hour)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Default SMTP submission port (STARTTLS)
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Default artifact served to verified sessions
pub const DEFAULT_ARTIFACT_PATH: &str = "assets/downloads/artifact.zip";

/// Download file name presented to the client
pub const DEFAULT_ARTIFACT_NAME: &str = "artifact.zip";

/// HTTP header names
pub mod headers {
    /// Session bearer token header
    pub const X_SESSION_TOKEN: &str = "X-Session-Token";
}
