use crate::error::ReservationError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking status in the reservation lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Locked,
    Confirmed,
    IntakeSubmitted,
    Cancelled,
}

impl BookingStatus {
    /// The one place transition legality is decided. Handlers and
    /// repositories route every status change through here; the SQL
    /// compare-and-set guards mirror the same edges.
    pub fn validate_transition(from: Self, to: Self) -> Result<(), ReservationError> {
        use BookingStatus::*;
        let legal = matches!(
            (from, to),
            (Pending, Locked)
                | (Locked, Confirmed)
                | (Locked, Cancelled)
                | (Confirmed, IntakeSubmitted)
                // Intake resubmission overwrites in place.
                | (IntakeSubmitted, IntakeSubmitted)
        );
        if legal {
            Ok(())
        } else {
            Err(ReservationError::InvalidTransition { from, to })
        }
    }

    /// Statuses that count against slot capacity. A LOCKED booking only
    /// counts while its lock TTL has not elapsed; callers pair this with
    /// `Booking::lock_expired`.
    pub fn claims_capacity(&self) -> bool {
        matches!(self, Self::Locked | Self::Confirmed | Self::IntakeSubmitted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Locked => "LOCKED",
            Self::Confirmed => "CONFIRMED",
            Self::IntakeSubmitted => "INTAKE_SUBMITTED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = ReservationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "LOCKED" => Ok(Self::Locked),
            "CONFIRMED" => Ok(Self::Confirmed),
            "INTAKE_SUBMITTED" => Ok(Self::IntakeSubmitted),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(ReservationError::Storage(format!(
                "unknown booking status {}",
                other
            ))),
        }
    }
}

/// Outcome of a payment confirmation attempt. Repeated verification with
/// the same valid signature lands on `AlreadyConfirmed`, never a second
/// charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    AlreadyConfirmed,
}

/// A time-bounded claim on a slot, created by locking and promoted by
/// payment verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub code: String,
    pub slot_id: Uuid,
    pub email: String,
    pub status: BookingStatus,
    pub payment_order_ref: Option<String>,
    pub payment_ref: Option<String>,
    pub lock_expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Create a fresh LOCKED booking holding the slot for `ttl_seconds`.
    pub fn lock(slot_id: Uuid, email: String, ttl_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: sprint_shared::booking_code(),
            slot_id,
            email,
            status: BookingStatus::Locked,
            payment_order_ref: None,
            payment_ref: None,
            lock_expires_at: now + Duration::seconds(ttl_seconds),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn lock_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Locked && self.lock_expires_at <= now
    }

    /// Whether this booking still counts against its slot's capacity.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.status.claims_capacity() && !self.lock_expired(now)
    }

    pub fn transition(&mut self, to: BookingStatus) -> Result<(), ReservationError> {
        BookingStatus::validate_transition(self.status, to)?;
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked_booking() -> Booking {
        Booking::lock(Uuid::new_v4(), "a@example.com".to_string(), 900)
    }

    #[test]
    fn lifecycle_happy_path() {
        let mut booking = locked_booking();
        assert_eq!(booking.status, BookingStatus::Locked);

        booking.transition(BookingStatus::Confirmed).unwrap();
        booking.transition(BookingStatus::IntakeSubmitted).unwrap();
        // Resubmission is a legal self-loop.
        booking.transition(BookingStatus::IntakeSubmitted).unwrap();
    }

    #[test]
    fn ttl_expiry_cancels_a_lock() {
        let mut booking = locked_booking();
        booking.transition(BookingStatus::Cancelled).unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let mut booking = locked_booking();
        // Cannot skip payment.
        assert!(booking.transition(BookingStatus::IntakeSubmitted).is_err());

        booking.transition(BookingStatus::Confirmed).unwrap();
        // A confirmed booking can no longer be cancelled or re-locked.
        assert!(booking.transition(BookingStatus::Cancelled).is_err());
        assert!(booking.transition(BookingStatus::Locked).is_err());
    }

    #[test]
    fn expired_lock_no_longer_claims_capacity() {
        let mut booking = locked_booking();
        assert!(booking.is_live(Utc::now()));

        booking.lock_expires_at = Utc::now() - Duration::seconds(1);
        assert!(!booking.is_live(Utc::now()));
        assert!(booking.lock_expired(Utc::now()));
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Locked,
            BookingStatus::Confirmed,
            BookingStatus::IntakeSubmitted,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert!("HELD".parse::<BookingStatus>().is_err());
    }
}
