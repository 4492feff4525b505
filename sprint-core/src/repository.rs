use crate::booking::{Booking, ConfirmOutcome};
use crate::error::ReservationError;
use crate::intake::IntakeSubmission;
use crate::otp::OtpChallenge;
use crate::slot::Slot;
use async_trait::async_trait;
use uuid::Uuid;

/// Read access to slot inventory.
#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Active slots that still have free capacity, soonest first.
    async fn list_open_slots(&self) -> Result<Vec<Slot>, ReservationError>;

    async fn get_slot(&self, id: Uuid) -> Result<Option<Slot>, ReservationError>;
}

/// Booking lifecycle persistence. Implementations must make `lock_slot`
/// and `confirm_paid` atomic conditional writes; read-then-write here
/// would reopen the race windows the service exists to close.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Atomically claim a slot for `email`: serialize against concurrent
    /// lockers, count live claims, and insert a LOCKED booking with the
    /// given TTL. Re-locking a slot the caller already holds returns the
    /// existing booking.
    async fn lock_slot(
        &self,
        slot_id: Uuid,
        email: &str,
        ttl_seconds: i64,
    ) -> Result<Booking, ReservationError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, ReservationError>;

    /// The caller's most recent non-cancelled booking.
    async fn latest_for_email(&self, email: &str) -> Result<Option<Booking>, ReservationError>;

    /// The caller's live LOCKED booking on a slot, if any.
    async fn live_lock_for_slot(
        &self,
        slot_id: Uuid,
        email: &str,
    ) -> Result<Option<Booking>, ReservationError>;

    /// Record the gateway order reference on a still-locked booking.
    async fn attach_payment_order(
        &self,
        booking_id: Uuid,
        email: &str,
        order_ref: &str,
    ) -> Result<(), ReservationError>;

    /// Compare-and-set LOCKED -> CONFIRMED against the stored order
    /// reference. Idempotent: a booking already confirmed under the same
    /// reference reports `AlreadyConfirmed`.
    async fn confirm_paid(
        &self,
        booking_id: Uuid,
        order_ref: &str,
        payment_ref: &str,
    ) -> Result<ConfirmOutcome, ReservationError>;

    /// Sweep LOCKED bookings whose TTL elapsed to CANCELLED. Returns the
    /// number of locks released.
    async fn cancel_expired_locks(&self) -> Result<u64, ReservationError>;
}

/// OTP challenge persistence.
#[async_trait]
pub trait OtpRepository: Send + Sync {
    async fn store_challenge(&self, challenge: &OtpChallenge) -> Result<(), ReservationError>;

    /// Atomically consume a live matching challenge. `false` means no
    /// unconsumed, unexpired challenge matched.
    async fn consume_challenge(&self, email: &str, code: &str)
        -> Result<bool, ReservationError>;

    /// Drop a challenge whose delivery failed, so no live challenge is
    /// left behind by a failed request.
    async fn discard_challenge(&self, id: Uuid) -> Result<(), ReservationError>;
}

/// Intake persistence. Upsert semantics: one record per booking.
#[async_trait]
pub trait IntakeRepository: Send + Sync {
    /// Validate ownership and state, upsert the record, and CAS the
    /// booking to INTAKE_SUBMITTED in one transaction. Returns the
    /// updated booking.
    async fn upsert_intake(
        &self,
        submission: &IntakeSubmission,
        email: &str,
    ) -> Result<Booking, ReservationError>;
}
