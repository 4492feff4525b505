use crate::booking::BookingStatus;
use uuid::Uuid;

/// Every failure the reservation service can surface to a caller.
///
/// Variants map 1:1 onto the wire-level error codes; `storage` wraps
/// driver errors so repository traits stay free of sqlx types.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("Slot {0} has no remaining capacity")]
    SlotUnavailable(Uuid),

    #[error("Too many OTP requests for this email")]
    RateLimited,

    #[error("OTP code invalid, consumed, or expired")]
    InvalidCode,

    #[error("Booking {0} is not holding a lock")]
    BookingNotLocked(Uuid),

    #[error("Booking {0} lock expired before payment completed")]
    BookingExpired(Uuid),

    #[error("Upstream gateway failure: {0}")]
    Gateway(String),

    #[error("Payment signature did not verify")]
    SignatureInvalid,

    #[error("Invalid submission: {0}")]
    Validation(String),

    #[error("Illegal booking transition {from:?} -> {to:?}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ReservationError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    pub fn gateway(err: impl std::fmt::Display) -> Self {
        Self::Gateway(err.to_string())
    }
}
