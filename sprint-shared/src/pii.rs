use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// An email address that masks its local part in Debug/Display output.
///
/// API responses need the real address, but log macros like
/// `tracing::info!("{:?}", ...)` must not leak it. Serialization stays
/// unmasked; only the formatting impls redact.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct MaskedEmail(pub String);

impl MaskedEmail {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    fn masked(&self) -> String {
        match self.0.split_once('@') {
            Some((local, domain)) => {
                let head = local.chars().next().map(String::from).unwrap_or_default();
                format!("{}***@{}", head, domain)
            }
            None => "***".to_string(),
        }
    }
}

impl fmt::Debug for MaskedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl fmt::Display for MaskedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl Serialize for MaskedEmail {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl From<String> for MaskedEmail {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_local_part() {
        let email = MaskedEmail("jordan@example.com".to_string());
        assert_eq!(format!("{:?}", email), "j***@example.com");
        assert_eq!(email.as_str(), "jordan@example.com");
    }

    #[test]
    fn serializes_unmasked() {
        let email = MaskedEmail("a@b.co".to_string());
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"a@b.co\"");
    }
}
