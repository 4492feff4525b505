use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable time window with finite capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: i32,
    pub active: bool,
}

impl Slot {
    /// `live_claims` is the count of CONFIRMED/INTAKE_SUBMITTED bookings
    /// plus unexpired LOCKED ones, as computed inside the locking
    /// transaction.
    pub fn has_free_capacity(&self, live_claims: i64) -> bool {
        self.active && live_claims < i64::from(self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn slot(capacity: i32, active: bool) -> Slot {
        let now = Utc::now();
        Slot {
            id: Uuid::new_v4(),
            start_time: now,
            end_time: now + Duration::hours(1),
            capacity,
            active,
        }
    }

    #[test]
    fn capacity_boundary() {
        let s = slot(1, true);
        assert!(s.has_free_capacity(0));
        assert!(!s.has_free_capacity(1));
    }

    #[test]
    fn inactive_slot_never_has_capacity() {
        let s = slot(3, false);
        assert!(!s.has_free_capacity(0));
    }
}
