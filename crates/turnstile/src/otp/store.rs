//! In-memory OTP record store.

use std::collections::HashMap;

use tokio::sync::Mutex;

use gatehouse_common::GatehouseError;

use super::{OtpRecord, normalize_email};

/// Keyed store owning every live [`OtpRecord`].
///
/// At most one record per address. Every operation takes the map lock,
/// so concurrent issuance and verification for the same address
/// serialize into one consistent record state. Expiry is enforced
/// lazily at read time against the caller-supplied clock; there is no
/// background sweep. State does not survive a restart: outstanding
/// challenges die with the process.
pub struct OtpStore {
    records: Mutex<HashMap<String, OtpRecord>>,
    request_limit: u32,
    max_verify_attempts: u32,
}

impl OtpStore {
    pub fn new(request_limit: u32, max_verify_attempts: u32) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            request_limit,
            max_verify_attempts,
        }
    }

    /// Issue a code for `email`, creating or refreshing its record.
    ///
    /// A fresh record starts with `request_count = 1`. A live record is
    /// refreshed in place (new code and expiry, attempts reset to zero)
    /// and its `request_count` carried forward, unless the request
    /// budget is already spent, in which case the record is left
    /// untouched and `RateLimited` comes back. An expired record no
    /// longer counts against the address.
    pub async fn issue(
        &self,
        email: &str,
        code: &str,
        now: i64,
        expiry_secs: u64,
    ) -> Result<OtpRecord, GatehouseError> {
        let email = normalize_email(email);
        let mut records = self.records.lock().await;

        if records.get(&email).is_some_and(|r| now > r.expires_at) {
            tracing::debug!(email = %email, "expired challenge dropped on reissue");
            records.remove(&email);
        }

        let expires_at = now + expiry_secs as i64;
        match records.get_mut(&email) {
            Some(record) => {
                if record.request_count >= self.request_limit {
                    tracing::warn!(
                        email = %email,
                        request_count = record.request_count,
                        "issuance refused, request budget spent"
                    );
                    return Err(GatehouseError::RateLimited(
                        "too many codes requested for this address".to_string(),
                    ));
                }
                record.code = code.to_string();
                record.issued_at = now;
                record.expires_at = expires_at;
                record.attempts = 0;
                record.request_count += 1;
                Ok(record.clone())
            }
            None => {
                let record = OtpRecord {
                    email: email.clone(),
                    code: code.to_string(),
                    issued_at: now,
                    expires_at,
                    attempts: 0,
                    request_count: 1,
                };
                records.insert(email, record.clone());
                Ok(record)
            }
        }
    }

    /// Fetch the live record for `email`, if any.
    ///
    /// An expired record is deleted on the way out and reported as
    /// absent, so callers never see a stale challenge.
    pub async fn get(&self, email: &str, now: i64) -> Option<OtpRecord> {
        let email = normalize_email(email);
        let mut records = self.records.lock().await;
        match records.get(&email) {
            Some(record) if now > record.expires_at => {
                tracing::debug!(email = %email, "challenge expired, dropping record");
                records.remove(&email);
                None
            }
            Some(record) => Some(record.clone()),
            None => None,
        }
    }

    /// Count a failed submission against the live record.
    ///
    /// Returns the attempts the caller has left; `Some(0)` means the
    /// record just hit the limit and was deleted. `None` if there is no
    /// record to count against.
    pub async fn record_failed_attempt(&self, email: &str) -> Option<u32> {
        let email = normalize_email(email);
        let mut records = self.records.lock().await;

        let attempts = {
            let record = records.get_mut(&email)?;
            record.attempts += 1;
            record.attempts
        };

        if attempts >= self.max_verify_attempts {
            records.remove(&email);
            tracing::warn!(email = %email, "attempt budget spent, challenge invalidated");
            Some(0)
        } else {
            Some(self.max_verify_attempts - attempts)
        }
    }

    /// Drop the record for `email`. Absent records are fine.
    pub async fn remove(&self, email: &str) {
        let email = normalize_email(email);
        self.records.lock().await.remove(&email);
    }

    /// Records currently held (expired ones linger until the next read).
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}
