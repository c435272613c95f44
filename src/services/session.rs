//! Session manager
//!
//! Issues and reads the client-held session cookie. The cookie value is
//! `base64url(json(session)) . base64url(hmac_sha256(secret, payload))`; the
//! server keeps no session state beyond the signing secret.
//!
//! Reading an absent, malformed, tampered or expired cookie yields no
//! session rather than an error. Every request that presents a valid
//! session slides its expiry forward by the configured active duration.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use data_encoding::BASE64URL_NOPAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::SessionConfig;
use crate::models::{Session, SessionUser};

type HmacSha256 = Hmac<Sha256>;

/// Signed-cookie session manager
pub struct SessionManager {
    cookie_name: String,
    secret: Vec<u8>,
    duration: Duration,
    active_duration: Duration,
}

impl SessionManager {
    /// Create a session manager from configuration
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            secret: config.secret.as_bytes().to_vec(),
            duration: Duration::seconds(config.duration_secs as i64),
            active_duration: Duration::seconds(config.active_duration_secs as i64),
        }
    }

    /// Name of the session cookie
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Create a fresh session for an authenticated identity
    pub fn issue(&self, user: SessionUser) -> Session {
        let now = Utc::now();
        Session {
            user,
            issued_at: now,
            expires_at: now + self.duration,
        }
    }

    /// Slide the session expiry forward for activity.
    ///
    /// The deadline only ever moves forward: a fresh session whose base
    /// duration outlives the extension keeps its original expiry.
    pub fn extend(&self, session: &mut Session) {
        let extended = Utc::now() + self.active_duration;
        if extended > session.expires_at {
            session.expires_at = extended;
        }
    }

    /// Serialize and sign a session into a cookie value
    pub fn encode(&self, session: &Session) -> Result<String> {
        let payload = serde_json::to_vec(session).context("Failed to serialize session")?;
        let encoded = BASE64URL_NOPAD.encode(&payload);
        let signature = BASE64URL_NOPAD.encode(&self.sign(encoded.as_bytes()));
        Ok(format!("{}.{}", encoded, signature))
    }

    /// Read a session back out of a cookie value.
    ///
    /// Returns `None` for anything that is not a currently-valid session:
    /// bad structure, bad base64, bad signature, unparseable payload, or an
    /// expired deadline.
    pub fn decode(&self, token: &str) -> Option<Session> {
        let (payload, signature) = token.split_once('.')?;

        let signature = BASE64URL_NOPAD.decode(signature.as_bytes()).ok()?;
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let payload = BASE64URL_NOPAD.decode(payload.as_bytes()).ok()?;
        let session: Session = serde_json::from_slice(&payload).ok()?;

        if session.is_expired() {
            return None;
        }

        Some(session)
    }

    /// Build the Set-Cookie header value carrying a session
    pub fn cookie_header(&self, session: &Session) -> Result<String> {
        let token = self.encode(session)?;
        let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
        Ok(format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name, token, max_age
        ))
    }

    /// Build the Set-Cookie header value that removes the session cookie
    pub fn clear_cookie_header(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            self.cookie_name
        )
    }

    /// Pull this manager's cookie value out of a Cookie header
    pub fn cookie_value<'a>(&self, cookie_header: &'a str) -> Option<&'a str> {
        cookie_header
            .split(';')
            .map(str::trim)
            .find_map(|cookie| {
                let (name, value) = cookie.split_once('=')?;
                (name == self.cookie_name).then_some(value)
            })
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn manager() -> SessionManager {
        SessionManager::new(&SessionConfig {
            cookie_name: "session".to_string(),
            secret: "test-secret".to_string(),
            duration_secs: 120,
            active_duration_secs: 60,
        })
    }

    fn test_user(name: &str) -> SessionUser {
        SessionUser {
            user_name: name.to_string(),
            email: format!("{}@example.com", name),
            login_history: vec![],
        }
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let manager = manager();
        let session = manager.issue(test_user("alice"));

        let token = manager.encode(&session).unwrap();
        let decoded = manager.decode(&token).unwrap();
        assert_eq!(decoded, session);
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let manager = manager();
        let token = manager.encode(&manager.issue(test_user("alice"))).unwrap();

        let (payload, sig) = token.split_once('.').unwrap();
        let evil_payload = BASE64URL_NOPAD.encode(
            String::from_utf8(BASE64URL_NOPAD.decode(payload.as_bytes()).unwrap())
                .unwrap()
                .replace("alice", "admin")
                .as_bytes(),
        );
        assert!(manager.decode(&format!("{}.{}", evil_payload, sig)).is_none());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let manager = manager();
        let other = SessionManager::new(&SessionConfig {
            secret: "other-secret".to_string(),
            ..SessionConfig::default()
        });

        let token = manager.encode(&manager.issue(test_user("alice"))).unwrap();
        assert!(other.decode(&token).is_none());
    }

    #[test]
    fn test_expired_session_reads_as_none() {
        let manager = manager();
        let mut session = manager.issue(test_user("alice"));
        session.expires_at = Utc::now() - Duration::seconds(1);

        let token = manager.encode(&session).unwrap();
        assert!(manager.decode(&token).is_none());
    }

    #[test]
    fn test_extend_slides_deadline_forward_only() {
        let manager = manager();
        let mut session = manager.issue(test_user("alice"));
        let original = session.expires_at;

        // Fresh session: base duration (120s) outlives the extension (60s)
        manager.extend(&mut session);
        assert_eq!(session.expires_at, original);

        // Near-expiry session: the extension wins
        session.expires_at = Utc::now() + Duration::seconds(5);
        manager.extend(&mut session);
        assert!(session.expires_at > Utc::now() + Duration::seconds(50));
    }

    #[test]
    fn test_cookie_value_extraction() {
        let manager = manager();
        let header = "theme=dark; session=abc.def; lang=en";
        assert_eq!(manager.cookie_value(header), Some("abc.def"));
        assert_eq!(manager.cookie_value("theme=dark"), None);
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let header = manager().clear_cookie_header();
        assert!(header.contains("Max-Age=0"));
    }

    proptest! {
        #[test]
        fn prop_round_trip_any_identity(user_name in ".{0,64}", email in ".{0,64}") {
            let manager = manager();
            let session = manager.issue(SessionUser {
                user_name,
                email,
                login_history: vec![],
            });
            let token = manager.encode(&session).unwrap();
            prop_assert_eq!(manager.decode(&token), Some(session));
        }

        #[test]
        fn prop_garbage_tokens_never_decode(token in ".{0,128}") {
            // Arbitrary strings must read as "no session", never panic
            prop_assert!(manager().decode(&token).is_none());
        }
    }
}
