//! Session and access gate.
//!
//! Bearer-token sessions standing in for the browser session of a
//! classic web flow: accepting the terms opens one, a verified code
//! grants it a single artifact fetch, and expiry is enforced lazily the
//! same way the OTP store does it. Sessions do not survive a restart.

use std::collections::HashMap;

use tokio::sync::Mutex;

/// One caller's progress through the gate.
#[derive(Debug, Clone)]
struct Session {
    expires_at: i64,
    /// Address a code was last issued to from this session
    pending_email: Option<String>,
    /// Set by a verified code; consumed by the first download
    download_grant: bool,
}

/// Keyed session store; the only writer of session state.
pub struct SessionGate {
    sessions: Mutex<HashMap<String, Session>>,
    ttl_secs: u64,
}

impl SessionGate {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl_secs,
        }
    }

    /// Open a session for a caller who accepted the terms.
    pub async fn open(&self, now: i64) -> String {
        let token = generate_session_token();
        let session = Session {
            expires_at: now + self.ttl_secs as i64,
            pending_email: None,
            download_grant: false,
        };
        self.sessions.lock().await.insert(token.clone(), session);
        token
    }

    /// True if the token names a live session.
    pub async fn is_open(&self, token: &str, now: i64) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(token) {
            Some(session) if now > session.expires_at => {
                sessions.remove(token);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Bind the address a code was just sent to.
    pub async fn bind_email(&self, token: &str, email: &str, now: i64) -> bool {
        let mut sessions = self.sessions.lock().await;
        if sessions.get(token).is_some_and(|s| now > s.expires_at) {
            sessions.remove(token);
            return false;
        }
        match sessions.get_mut(token) {
            Some(session) => {
                session.pending_email = Some(email.to_string());
                true
            }
            None => false,
        }
    }

    /// Address currently under verification for this session.
    pub async fn pending_email(&self, token: &str, now: i64) -> Option<String> {
        let mut sessions = self.sessions.lock().await;
        if sessions.get(token).is_some_and(|s| now > s.expires_at) {
            sessions.remove(token);
            return None;
        }
        sessions.get(token)?.pending_email.clone()
    }

    /// Authorize exactly one artifact fetch.
    pub async fn grant_download(&self, token: &str, now: i64) -> bool {
        let mut sessions = self.sessions.lock().await;
        if sessions.get(token).is_some_and(|s| now > s.expires_at) {
            sessions.remove(token);
            return false;
        }
        match sessions.get_mut(token) {
            Some(session) => {
                session.download_grant = true;
                true
            }
            None => false,
        }
    }

    /// Consume the grant. False when there is none to consume.
    pub async fn take_download_grant(&self, token: &str, now: i64) -> bool {
        let mut sessions = self.sessions.lock().await;
        if sessions.get(token).is_some_and(|s| now > s.expires_at) {
            sessions.remove(token);
            return false;
        }
        match sessions.get_mut(token) {
            Some(session) if session.download_grant => {
                session.download_grant = false;
                true
            }
            _ => false,
        }
    }

    /// Discard the session unconditionally.
    pub async fn remove(&self, token: &str) {
        self.sessions.lock().await.remove(token);
    }

    /// Sessions currently held (expired ones linger until the next read).
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

/// Generate an unguessable session token
fn generate_session_token() -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: u64 = 3600;

    #[tokio::test]
    async fn open_sessions_are_visible_until_expiry() {
        let gate = SessionGate::new(TTL);
        let token = gate.open(0).await;

        assert!(gate.is_open(&token, 0).await);
        assert!(gate.is_open(&token, 3600).await, "expiry is inclusive");
        assert!(!gate.is_open(&token, 3601).await);
        // Lazy expiry removed it for good
        assert!(gate.is_empty().await);
    }

    #[tokio::test]
    async fn unknown_tokens_are_closed() {
        let gate = SessionGate::new(TTL);
        assert!(!gate.is_open("made-up-token", 0).await);
        assert!(!gate.grant_download("made-up-token", 0).await);
        assert_eq!(gate.pending_email("made-up-token", 0).await, None);
    }

    #[tokio::test]
    async fn tokens_are_unique_and_unpadded() {
        let gate = SessionGate::new(TTL);
        let a = gate.open(0).await;
        let b = gate.open(0).await;
        assert_ne!(a, b);
        assert!(!a.contains('='));
        assert_eq!(gate.len().await, 2);
    }

    #[tokio::test]
    async fn pending_email_round_trips() {
        let gate = SessionGate::new(TTL);
        let token = gate.open(0).await;

        assert_eq!(gate.pending_email(&token, 0).await, None);
        assert!(gate.bind_email(&token, "a@b.com", 1).await);
        assert_eq!(gate.pending_email(&token, 2).await, Some("a@b.com".to_string()));
    }

    #[tokio::test]
    async fn the_grant_is_single_use() {
        let gate = SessionGate::new(TTL);
        let token = gate.open(0).await;

        assert!(!gate.take_download_grant(&token, 1).await, "nothing granted yet");
        assert!(gate.grant_download(&token, 1).await);
        assert!(gate.take_download_grant(&token, 2).await);
        assert!(!gate.take_download_grant(&token, 3).await, "grant was consumed");
    }

    #[tokio::test]
    async fn expiry_voids_the_grant() {
        let gate = SessionGate::new(TTL);
        let token = gate.open(0).await;
        gate.grant_download(&token, 1).await;

        assert!(!gate.take_download_grant(&token, 3601).await);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let gate = SessionGate::new(TTL);
        let token = gate.open(0).await;
        gate.remove(&token).await;
        gate.remove(&token).await;
        assert!(!gate.is_open(&token, 0).await);
    }
}
