pub mod booking;
pub mod email;
pub mod error;
pub mod intake;
pub mod otp;
pub mod payment;
pub mod repository;
pub mod slot;

pub use booking::{Booking, BookingStatus, ConfirmOutcome};
pub use error::ReservationError;
pub use intake::IntakeSubmission;
pub use otp::OtpChallenge;
pub use slot::Slot;
