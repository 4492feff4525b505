use sprint_core::email::OtpMailer;
use sprint_core::payment::PaymentGateway;
use sprint_core::repository::{
    BookingRepository, IntakeRepository, OtpRepository, SlotRepository,
};
use sprint_store::app_config::BusinessRules;
use sprint_store::RedisClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub slots: Arc<dyn SlotRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub otps: Arc<dyn OtpRepository>,
    pub intakes: Arc<dyn IntakeRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn OtpMailer>,
    pub redis: Arc<RedisClient>,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}
