//! Core types shared across Gatehouse components.

use serde::{Deserialize, Serialize};

/// Outcome of one verification submission.
///
/// `NotFound` covers both a never-issued and an expired challenge; the
/// caller cannot tell which, so a response does not reveal whether an
/// address ever held one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum VerifyOutcome {
    /// Code matched; the challenge is consumed
    Success,
    /// No live challenge for this address
    NotFound,
    /// Wrong code, attempts remain
    Invalid { attempts_remaining: u32 },
    /// Wrong code and the attempt budget is spent; challenge invalidated
    AttemptsExhausted,
}

impl VerifyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Short label for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotFound => "not_found",
            Self::Invalid { .. } => "invalid",
            Self::AttemptsExhausted => "attempts_exhausted",
        }
    }
}

/// Metrics snapshot for monitoring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Live OTP challenges in the store
    pub active_challenges: u64,

    /// Open sessions (terms accepted, neither expired nor reset)
    pub active_sessions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels_are_stable() {
        assert_eq!(VerifyOutcome::Success.as_str(), "success");
        assert_eq!(VerifyOutcome::NotFound.as_str(), "not_found");
        assert_eq!(
            VerifyOutcome::Invalid {
                attempts_remaining: 3
            }
            .as_str(),
            "invalid"
        );
        assert_eq!(
            VerifyOutcome::AttemptsExhausted.as_str(),
            "attempts_exhausted"
        );
    }

    #[test]
    fn only_success_is_success() {
        assert!(VerifyOutcome::Success.is_success());
        assert!(!VerifyOutcome::NotFound.is_success());
        assert!(
            !VerifyOutcome::Invalid {
                attempts_remaining: 1
            }
            .is_success()
        );
    }
}
