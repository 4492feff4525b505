use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
    pub razorpay: RazorpayConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// How long a LOCKED booking holds its slot before the claim dies.
    pub slot_lock_seconds: u64,
    pub otp_ttl_seconds: u64,
    /// Fixed-window OTP throttle per email.
    pub otp_max_requests: i64,
    pub otp_window_seconds: i64,
    /// How often the sweeper cancels expired locks.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Sprint price in the currency's minor unit.
    pub price_paise: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    #[serde(default = "default_razorpay_base_url")]
    pub base_url: String,
}

fn default_razorpay_base_url() -> String {
    "https://api.razorpay.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment file is optional.
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in.
            .add_source(config::File::with_name("config/local").required(false))
            // `SPRINT__AUTH__JWT_SECRET=...` style environment overrides.
            .add_source(config::Environment::with_prefix("SPRINT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
