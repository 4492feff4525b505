use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use sprint_core::email::OtpMailer;
use sprint_core::error::ReservationError;
use sprint_shared::MaskedEmail;
use std::sync::Mutex;
use tracing::info;

/// SMTP delivery of OTP codes via lettre.
#[derive(Clone)]
pub struct SmtpOtpMailer {
    server: String,
    port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl SmtpOtpMailer {
    pub fn new(
        server: String,
        port: u16,
        username: String,
        password: String,
        from_email: String,
        from_name: String,
    ) -> Self {
        Self {
            server,
            port,
            credentials: Credentials::new(username, password),
            from_email,
            from_name,
        }
    }

    // A fresh transport per send; OTP volume does not justify pooling.
    fn build_transport(&self) -> Result<SmtpTransport, ReservationError> {
        Ok(SmtpTransport::relay(&self.server)
            .map_err(|e| ReservationError::Gateway(format!("SMTP relay error: {}", e)))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

#[async_trait]
impl OtpMailer for SmtpOtpMailer {
    async fn send_otp(
        &self,
        to: &MaskedEmail,
        code: &str,
        ttl_minutes: i64,
    ) -> Result<(), ReservationError> {
        let email = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| ReservationError::Gateway(format!("invalid from address: {}", e)))?,
            )
            .to(to
                .as_str()
                .parse()
                .map_err(|e| ReservationError::Gateway(format!("invalid to address: {}", e)))?)
            .subject("Your sign-in code")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your 48H Lead Catcher Sprint sign-in code is {}.\n\n\
                 It expires in {} minutes. If you didn't request it, ignore this email.",
                code, ttl_minutes
            ))
            .map_err(|e| ReservationError::Gateway(format!("failed to build email: {}", e)))?;

        let mailer = self.build_transport()?;

        // lettre's SmtpTransport is blocking.
        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| ReservationError::Gateway(format!("failed to send email: {}", e)))
        })
        .await
        .map_err(|e| ReservationError::Gateway(format!("email task failed: {}", e)))??;

        info!(recipient = %to, "OTP dispatched");
        Ok(())
    }
}

/// Records sends instead of delivering. Test double for the OTP flow.
#[derive(Default)]
pub struct MemoryMailer {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl MemoryMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl OtpMailer for MemoryMailer {
    async fn send_otp(
        &self,
        to: &MaskedEmail,
        code: &str,
        _ttl_minutes: i64,
    ) -> Result<(), ReservationError> {
        if self.fail {
            return Err(ReservationError::Gateway("simulated SMTP outage".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| ReservationError::Gateway("mailer poisoned".to_string()))?
            .push((to.as_str().to_string(), code.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_mailer_records_sends() {
        let mailer = MemoryMailer::default();
        let to = MaskedEmail::from("a@example.com".to_string());

        mailer.send_otp(&to, "123456", 10).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], ("a@example.com".to_string(), "123456".to_string()));
    }

    #[tokio::test]
    async fn failing_mailer_reports_gateway_error() {
        let mailer = MemoryMailer::failing();
        let to = MaskedEmail::from("a@example.com".to_string());

        let err = mailer.send_otp(&to, "123456", 10).await.unwrap_err();
        assert!(matches!(err, ReservationError::Gateway(_)));
    }

    #[test]
    fn from_header_format() {
        let mailer = SmtpOtpMailer::new(
            "smtp.example.com".to_string(),
            587,
            "user".to_string(),
            "pass".to_string(),
            "noreply@example.com".to_string(),
            "Lead Catcher".to_string(),
        );
        assert_eq!(mailer.from_header(), "Lead Catcher <noreply@example.com>");
    }
}
