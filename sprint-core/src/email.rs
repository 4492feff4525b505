use crate::error::ReservationError;
use async_trait::async_trait;
use sprint_shared::MaskedEmail;

/// Transactional delivery of OTP codes. The service only ever reports
/// dispatch failures to the caller; it never retries inside a state
/// transition.
#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp(
        &self,
        to: &MaskedEmail,
        code: &str,
        ttl_minutes: i64,
    ) -> Result<(), ReservationError>;
}
