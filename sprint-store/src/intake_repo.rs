use crate::booking_repo::{BookingRow, BOOKING_COLUMNS};
use async_trait::async_trait;
use sprint_core::booking::Booking;
use sprint_core::error::ReservationError;
use sprint_core::intake::IntakeSubmission;
use sprint_core::repository::IntakeRepository;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgIntakeRepository {
    pool: PgPool,
}

impl PgIntakeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IntakeRepository for PgIntakeRepository {
    async fn upsert_intake(
        &self,
        submission: &IntakeSubmission,
        email: &str,
    ) -> Result<Booking, ReservationError> {
        let mut tx = self.pool.begin().await.map_err(ReservationError::storage)?;

        // CAS the booking first; the guard doubles as the ownership and
        // state check. CONFIRMED and INTAKE_SUBMITTED are both legal
        // sources (resubmission overwrites).
        let result = sqlx::query(
            "UPDATE bookings SET status = 'INTAKE_SUBMITTED', updated_at = NOW() \
             WHERE id = $1 AND email = $2 \
               AND status IN ('CONFIRMED', 'INTAKE_SUBMITTED')",
        )
        .bind(submission.booking_id)
        .bind(email)
        .execute(&mut *tx)
        .await
        .map_err(ReservationError::storage)?;

        if result.rows_affected() == 0 {
            let row = sqlx::query_as::<_, BookingRow>(&format!(
                "SELECT {} FROM bookings WHERE id = $1",
                BOOKING_COLUMNS
            ))
            .bind(submission.booking_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(ReservationError::storage)?;

            return match row {
                None => Err(ReservationError::NotFound("booking")),
                Some(r) if r.email != email => Err(ReservationError::NotFound("booking")),
                Some(r) => Err(ReservationError::BookingNotLocked(r.id)),
            };
        }

        let benefits = serde_json::to_value(&submission.benefits)
            .map_err(ReservationError::storage)?;

        sqlx::query(
            "INSERT INTO intake_records \
             (id, booking_id, brand_name, offer_headline, packages_pricing, \
              whatsapp_number, benefits, testimonials, brand_colors, links) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (booking_id) DO UPDATE SET \
               brand_name = EXCLUDED.brand_name, \
               offer_headline = EXCLUDED.offer_headline, \
               packages_pricing = EXCLUDED.packages_pricing, \
               whatsapp_number = EXCLUDED.whatsapp_number, \
               benefits = EXCLUDED.benefits, \
               testimonials = EXCLUDED.testimonials, \
               brand_colors = EXCLUDED.brand_colors, \
               links = EXCLUDED.links, \
               updated_at = NOW()",
        )
        .bind(Uuid::new_v4())
        .bind(submission.booking_id)
        .bind(&submission.brand_name)
        .bind(&submission.offer_headline)
        .bind(&submission.packages_pricing)
        .bind(&submission.whatsapp_number)
        .bind(benefits)
        .bind(&submission.testimonials)
        .bind(&submission.brand_colors)
        .bind(&submission.links)
        .execute(&mut *tx)
        .await
        .map_err(ReservationError::storage)?;

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(submission.booking_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(ReservationError::storage)?;

        tx.commit().await.map_err(ReservationError::storage)?;

        row.try_into()
    }
}
