use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sprint_core::error::ReservationError;
use sprint_core::slot::Slot;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::SessionClaims;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotDto {
    id: Uuid,
    start_time: chrono::DateTime<chrono::Utc>,
    end_time: chrono::DateTime<chrono::Utc>,
}

impl From<Slot> for SlotDto {
    fn from(slot: Slot) -> Self {
        Self {
            id: slot.id,
            start_time: slot.start_time,
            end_time: slot.end_time,
        }
    }
}

/// GET /api/sprint/slots
pub async fn list_slots(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let slots: Vec<SlotDto> = state
        .slots
        .list_open_slots()
        .await?
        .into_iter()
        .map(SlotDto::from)
        .collect();

    Ok(Json(json!({ "ok": true, "slots": slots })))
}

/// GET /api/sprint/me
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<Value>, ApiError> {
    let booking = state.bookings.latest_for_email(&claims.sub).await?;
    Ok(Json(json!({ "ok": true, "booking": booking })))
}

#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    #[serde(rename = "bookingId")]
    booking_id: Option<Uuid>,
}

/// GET /api/sprint/booking[?bookingId=]
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Value>, ApiError> {
    let booking = match query.booking_id {
        Some(id) => {
            let booking = state
                .bookings
                .get_booking(id)
                .await?
                .ok_or(ReservationError::NotFound("booking"))?;
            // Bookings are only visible to their owner.
            if booking.email != claims.sub {
                return Err(ReservationError::NotFound("booking").into());
            }
            booking
        }
        None => state
            .bookings
            .latest_for_email(&claims.sub)
            .await?
            .ok_or(ReservationError::NotFound("booking"))?,
    };

    Ok(Json(json!({ "ok": true, "booking": booking })))
}
