pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod intake_repo;
pub mod otp_repo;
pub mod redis_repo;
pub mod slot_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use intake_repo::PgIntakeRepository;
pub use otp_repo::PgOtpRepository;
pub use redis_repo::RedisClient;
pub use slot_repo::PgSlotRepository;
