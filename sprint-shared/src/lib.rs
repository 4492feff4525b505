pub mod code;
pub mod pii;

pub use code::{booking_code, otp_code};
pub use pii::MaskedEmail;
