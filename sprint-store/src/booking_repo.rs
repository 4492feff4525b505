use async_trait::async_trait;
use chrono::Utc;
use sprint_core::booking::{Booking, BookingStatus, ConfirmOutcome};
use sprint_core::error::ReservationError;
use sprint_core::repository::BookingRepository;
use sprint_shared::MaskedEmail;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub code: String,
    pub slot_id: Uuid,
    pub email: String,
    pub status: String,
    pub payment_order_ref: Option<String>,
    pub payment_ref: Option<String>,
    pub lock_expires_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = ReservationError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            code: row.code,
            slot_id: row.slot_id,
            email: row.email,
            status: row.status.parse::<BookingStatus>()?,
            payment_order_ref: row.payment_order_ref,
            payment_ref: row.payment_ref,
            lock_expires_at: row.lock_expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) const BOOKING_COLUMNS: &str =
    "id, code, slot_id, email, status, payment_order_ref, payment_ref, \
     lock_expires_at, created_at, updated_at";

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn lock_slot(
        &self,
        slot_id: Uuid,
        email: &str,
        ttl_seconds: i64,
    ) -> Result<Booking, ReservationError> {
        let mut tx = self.pool.begin().await.map_err(ReservationError::storage)?;

        // FOR UPDATE serializes every lock attempt on this slot; the
        // claim count below is therefore race-free.
        let slot: Option<(i32, bool)> =
            sqlx::query_as("SELECT capacity, active FROM slots WHERE id = $1 FOR UPDATE")
                .bind(slot_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(ReservationError::storage)?;

        let (capacity, active) = slot.ok_or(ReservationError::NotFound("slot"))?;
        if !active {
            return Err(ReservationError::SlotUnavailable(slot_id));
        }

        // Re-locking a slot the caller already holds is a no-op.
        let existing = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings \
             WHERE slot_id = $1 AND email = $2 \
               AND (status IN ('CONFIRMED', 'INTAKE_SUBMITTED') \
                    OR (status = 'LOCKED' AND lock_expires_at > NOW())) \
             LIMIT 1",
            BOOKING_COLUMNS
        ))
        .bind(slot_id)
        .bind(email)
        .fetch_optional(&mut *tx)
        .await
        .map_err(ReservationError::storage)?;

        if let Some(row) = existing {
            tx.commit().await.map_err(ReservationError::storage)?;
            return row.try_into();
        }

        let (live_claims,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings \
             WHERE slot_id = $1 \
               AND (status IN ('CONFIRMED', 'INTAKE_SUBMITTED') \
                    OR (status = 'LOCKED' AND lock_expires_at > NOW()))",
        )
        .bind(slot_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(ReservationError::storage)?;

        if live_claims >= i64::from(capacity) {
            // Dropping the transaction rolls back; nothing was written.
            return Err(ReservationError::SlotUnavailable(slot_id));
        }

        let booking = Booking::lock(slot_id, email.to_string(), ttl_seconds);
        sqlx::query(
            "INSERT INTO bookings \
             (id, code, slot_id, email, status, lock_expires_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(booking.id)
        .bind(&booking.code)
        .bind(booking.slot_id)
        .bind(&booking.email)
        .bind(booking.status.as_str())
        .bind(booking.lock_expires_at)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(ReservationError::storage)?;

        tx.commit().await.map_err(ReservationError::storage)?;

        debug!(
            booking_id = %booking.id,
            %slot_id,
            holder = %MaskedEmail::from(email.to_string()),
            "slot locked"
        );
        Ok(booking)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, ReservationError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ReservationError::storage)?;

        row.map(Booking::try_from).transpose()
    }

    async fn latest_for_email(&self, email: &str) -> Result<Option<Booking>, ReservationError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings \
             WHERE email = $1 AND status <> 'CANCELLED' \
             ORDER BY created_at DESC LIMIT 1",
            BOOKING_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(ReservationError::storage)?;

        row.map(Booking::try_from).transpose()
    }

    async fn live_lock_for_slot(
        &self,
        slot_id: Uuid,
        email: &str,
    ) -> Result<Option<Booking>, ReservationError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings \
             WHERE slot_id = $1 AND email = $2 \
               AND status = 'LOCKED' AND lock_expires_at > NOW() \
             ORDER BY created_at DESC LIMIT 1",
            BOOKING_COLUMNS
        ))
        .bind(slot_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(ReservationError::storage)?;

        row.map(Booking::try_from).transpose()
    }

    async fn attach_payment_order(
        &self,
        booking_id: Uuid,
        email: &str,
        order_ref: &str,
    ) -> Result<(), ReservationError> {
        let result = sqlx::query(
            "UPDATE bookings SET payment_order_ref = $3, updated_at = NOW() \
             WHERE id = $1 AND email = $2 \
               AND status = 'LOCKED' AND lock_expires_at > NOW()",
        )
        .bind(booking_id)
        .bind(email)
        .bind(order_ref)
        .execute(&self.pool)
        .await
        .map_err(ReservationError::storage)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Conditional update matched nothing: report why.
        match self.get_booking(booking_id).await? {
            None => Err(ReservationError::NotFound("booking")),
            Some(b) if b.email != email => Err(ReservationError::NotFound("booking")),
            Some(b) if b.lock_expired(Utc::now()) || b.status == BookingStatus::Cancelled => {
                Err(ReservationError::BookingExpired(booking_id))
            }
            Some(_) => Err(ReservationError::BookingNotLocked(booking_id)),
        }
    }

    async fn confirm_paid(
        &self,
        booking_id: Uuid,
        order_ref: &str,
        payment_ref: &str,
    ) -> Result<ConfirmOutcome, ReservationError> {
        // Single compare-and-set; concurrent verifies race on this UPDATE
        // and exactly one of them flips the status.
        let result = sqlx::query(
            "UPDATE bookings \
             SET status = 'CONFIRMED', payment_ref = $3, updated_at = NOW() \
             WHERE id = $1 AND status = 'LOCKED' \
               AND payment_order_ref = $2 AND lock_expires_at > NOW()",
        )
        .bind(booking_id)
        .bind(order_ref)
        .bind(payment_ref)
        .execute(&self.pool)
        .await
        .map_err(ReservationError::storage)?;

        if result.rows_affected() == 1 {
            return Ok(ConfirmOutcome::Confirmed);
        }

        let booking = self
            .get_booking(booking_id)
            .await?
            .ok_or(ReservationError::NotFound("booking"))?;

        match booking.status {
            BookingStatus::Confirmed | BookingStatus::IntakeSubmitted
                if booking.payment_order_ref.as_deref() == Some(order_ref) =>
            {
                Ok(ConfirmOutcome::AlreadyConfirmed)
            }
            BookingStatus::Cancelled => Err(ReservationError::BookingExpired(booking_id)),
            BookingStatus::Locked if booking.lock_expired(Utc::now()) => {
                Err(ReservationError::BookingExpired(booking_id))
            }
            _ => Err(ReservationError::BookingNotLocked(booking_id)),
        }
    }

    async fn cancel_expired_locks(&self) -> Result<u64, ReservationError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'CANCELLED', updated_at = NOW() \
             WHERE status = 'LOCKED' AND lock_expires_at <= NOW()",
        )
        .execute(&self.pool)
        .await
        .map_err(ReservationError::storage)?;

        Ok(result.rows_affected())
    }
}
