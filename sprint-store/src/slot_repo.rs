use async_trait::async_trait;
use sprint_core::error::ReservationError;
use sprint_core::repository::SlotRepository;
use sprint_core::slot::Slot;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgSlotRepository {
    pool: PgPool,
}

impl PgSlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SlotRow {
    id: Uuid,
    start_time: chrono::DateTime<chrono::Utc>,
    end_time: chrono::DateTime<chrono::Utc>,
    capacity: i32,
    active: bool,
}

impl From<SlotRow> for Slot {
    fn from(row: SlotRow) -> Self {
        Slot {
            id: row.id,
            start_time: row.start_time,
            end_time: row.end_time,
            capacity: row.capacity,
            active: row.active,
        }
    }
}

#[async_trait]
impl SlotRepository for PgSlotRepository {
    async fn list_open_slots(&self) -> Result<Vec<Slot>, ReservationError> {
        // Upcoming active slots whose live claims (confirmed or
        // unexpired-locked) leave free capacity.
        let rows = sqlx::query_as::<_, SlotRow>(
            "SELECT s.id, s.start_time, s.end_time, s.capacity, s.active \
             FROM slots s \
             WHERE s.active AND s.start_time > NOW() \
               AND (SELECT COUNT(*) FROM bookings b \
                    WHERE b.slot_id = s.id \
                      AND (b.status IN ('CONFIRMED', 'INTAKE_SUBMITTED') \
                           OR (b.status = 'LOCKED' AND b.lock_expires_at > NOW()))) \
                   < s.capacity \
             ORDER BY s.start_time ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ReservationError::storage)?;

        Ok(rows.into_iter().map(Slot::from).collect())
    }

    async fn get_slot(&self, id: Uuid) -> Result<Option<Slot>, ReservationError> {
        let row = sqlx::query_as::<_, SlotRow>(
            "SELECT id, start_time, end_time, capacity, active FROM slots WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ReservationError::storage)?;

        Ok(row.map(Slot::from))
    }
}
