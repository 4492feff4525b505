use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single-use email verification challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn issue(email: String, ttl_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            code: sprint_shared::otp_code(),
            expires_at: now + Duration::seconds(ttl_seconds),
            consumed: false,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// A challenge verifies only while unconsumed and unexpired. The
    /// persisted path enforces the same predicate in one conditional
    /// UPDATE, so a code can never verify twice.
    pub fn matches(&self, code: &str, now: DateTime<Utc>) -> bool {
        !self.consumed && !self.is_expired(now) && self.code == code
    }

    pub fn consume(&mut self) {
        self.consumed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_challenge_matches_its_code() {
        let challenge = OtpChallenge::issue("a@example.com".to_string(), 600);
        let now = Utc::now();
        assert!(challenge.matches(&challenge.code, now));
        assert!(!challenge.matches("000001", now));
    }

    #[test]
    fn consumed_code_never_verifies_again() {
        let mut challenge = OtpChallenge::issue("a@example.com".to_string(), 600);
        let code = challenge.code.clone();
        challenge.consume();
        assert!(!challenge.matches(&code, Utc::now()));
    }

    #[test]
    fn expired_code_is_rejected() {
        let mut challenge = OtpChallenge::issue("a@example.com".to_string(), 600);
        challenge.expires_at = Utc::now() - Duration::seconds(1);
        assert!(challenge.is_expired(Utc::now()));
        assert!(!challenge.matches(&challenge.code.clone(), Utc::now()));
    }
}
