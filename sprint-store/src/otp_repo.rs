use async_trait::async_trait;
use sprint_core::error::ReservationError;
use sprint_core::otp::OtpChallenge;
use sprint_core::repository::OtpRepository;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgOtpRepository {
    pool: PgPool,
}

impl PgOtpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpRepository for PgOtpRepository {
    async fn store_challenge(&self, challenge: &OtpChallenge) -> Result<(), ReservationError> {
        sqlx::query(
            "INSERT INTO otp_challenges (id, email, code, expires_at, consumed, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(challenge.id)
        .bind(&challenge.email)
        .bind(&challenge.code)
        .bind(challenge.expires_at)
        .bind(challenge.consumed)
        .bind(challenge.created_at)
        .execute(&self.pool)
        .await
        .map_err(ReservationError::storage)?;

        Ok(())
    }

    async fn consume_challenge(
        &self,
        email: &str,
        code: &str,
    ) -> Result<bool, ReservationError> {
        // Single-use is enforced here: the conditional UPDATE flips
        // `consumed` at most once per challenge, so a concurrent second
        // verify with the same code matches zero rows.
        let result = sqlx::query(
            "UPDATE otp_challenges SET consumed = TRUE \
             WHERE email = $1 AND code = $2 AND NOT consumed AND expires_at > NOW()",
        )
        .bind(email)
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(ReservationError::storage)?;

        Ok(result.rows_affected() > 0)
    }

    async fn discard_challenge(&self, id: Uuid) -> Result<(), ReservationError> {
        sqlx::query("DELETE FROM otp_challenges WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(ReservationError::storage)?;

        Ok(())
    }
}
