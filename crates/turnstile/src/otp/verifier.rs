//! Submitted-code verification.

use std::sync::Arc;

use subtle::ConstantTimeEq;

use gatehouse_common::VerifyOutcome;

use super::OtpStore;

/// Checks submitted codes against the store.
///
/// Holds no state of its own; every call reads and mutates challenge
/// state through [`OtpStore`] operations only, so concurrent calls for
/// the same address resolve through the store's lock.
pub struct OtpVerifier {
    store: Arc<OtpStore>,
}

impl OtpVerifier {
    pub fn new(store: Arc<OtpStore>) -> Self {
        Self { store }
    }

    /// Verify one submission. Each miss costs one attempt.
    ///
    /// Never-issued and expired challenges are reported identically as
    /// `NotFound`; the store already dropped an expired record during
    /// the lookup.
    pub async fn verify(&self, email: &str, submitted: &str, now: i64) -> VerifyOutcome {
        let Some(record) = self.store.get(email, now).await else {
            return VerifyOutcome::NotFound;
        };

        if codes_match(submitted, &record.code) {
            self.store.remove(email).await;
            tracing::info!(email = %record.email, "code verified, challenge consumed");
            return VerifyOutcome::Success;
        }

        match self.store.record_failed_attempt(email).await {
            // Record vanished between the read and the miss; same answer
            // the caller would have gotten a moment later.
            None => VerifyOutcome::NotFound,
            Some(0) => VerifyOutcome::AttemptsExhausted,
            Some(remaining) => VerifyOutcome::Invalid {
                attempts_remaining: remaining,
            },
        }
    }
}

/// Constant-time comparison. Lengths may leak; digits do not.
fn codes_match(submitted: &str, expected: &str) -> bool {
    submitted.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::OtpStore;

    const EXPIRY: u64 = 600;

    fn services(request_limit: u32, max_attempts: u32) -> (Arc<OtpStore>, OtpVerifier) {
        let store = Arc::new(OtpStore::new(request_limit, max_attempts));
        let verifier = OtpVerifier::new(store.clone());
        (store, verifier)
    }

    #[tokio::test]
    async fn unknown_address_is_not_found() {
        let (_store, verifier) = services(5, 5);
        assert_eq!(
            verifier.verify("nobody@example.com", "123456", 0).await,
            VerifyOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn correct_code_succeeds_exactly_once() {
        let (store, verifier) = services(5, 5);
        store.issue("a@b.com", "123456", 0, EXPIRY).await.unwrap();

        assert_eq!(
            verifier.verify("a@b.com", "123456", 1).await,
            VerifyOutcome::Success
        );
        // Consumed: the same code is now worthless
        assert_eq!(
            verifier.verify("a@b.com", "123456", 2).await,
            VerifyOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn wrong_codes_count_down_then_exhaust() {
        let (store, verifier) = services(5, 5);
        store.issue("a@b.com", "123456", 0, EXPIRY).await.unwrap();

        for expected_remaining in [4, 3, 2, 1] {
            assert_eq!(
                verifier.verify("a@b.com", "000000", 1).await,
                VerifyOutcome::Invalid {
                    attempts_remaining: expected_remaining
                }
            );
        }
        assert_eq!(
            verifier.verify("a@b.com", "000000", 1).await,
            VerifyOutcome::AttemptsExhausted
        );
        // The invalidated challenge is gone, even for the right code
        assert_eq!(
            verifier.verify("a@b.com", "123456", 1).await,
            VerifyOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn expired_code_reads_as_not_found() {
        let (store, verifier) = services(5, 5);
        store.issue("a@b.com", "123456", 0, EXPIRY).await.unwrap();

        assert_eq!(
            verifier.verify("a@b.com", "123456", 661).await,
            VerifyOutcome::NotFound
        );

        // A fresh challenge after lazy expiry works normally
        store.issue("a@b.com", "654321", 661, EXPIRY).await.unwrap();
        assert_eq!(
            verifier.verify("a@b.com", "654321", 662).await,
            VerifyOutcome::Success
        );
    }

    #[tokio::test]
    async fn reissue_resets_the_attempt_budget() {
        let (store, verifier) = services(5, 3);
        store.issue("a@b.com", "111111", 0, EXPIRY).await.unwrap();
        verifier.verify("a@b.com", "000000", 1).await;
        verifier.verify("a@b.com", "000000", 1).await;

        store.issue("a@b.com", "222222", 2, EXPIRY).await.unwrap();
        assert_eq!(
            verifier.verify("a@b.com", "000000", 3).await,
            VerifyOutcome::Invalid {
                attempts_remaining: 2
            }
        );
    }

    #[tokio::test]
    async fn verification_uses_the_normalized_address() {
        let (store, verifier) = services(5, 5);
        store.issue("  User@Example.COM ", "123456", 0, EXPIRY).await.unwrap();

        assert_eq!(
            verifier.verify("user@example.com", "123456", 1).await,
            VerifyOutcome::Success
        );
    }
}
