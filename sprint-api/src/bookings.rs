use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use sprint_shared::MaskedEmail;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::SessionClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRequest {
    slot_id: Uuid,
}

/// POST /api/sprint/lock
///
/// Atomically claim the slot for the session email. The repository
/// serializes concurrent attempts, so at most `capacity` live claims
/// ever coexist; losers get SLOT_UNAVAILABLE.
pub async fn lock_slot(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(req): Json<LockRequest>,
) -> Result<Json<Value>, ApiError> {
    let ttl = state.business_rules.slot_lock_seconds as i64;
    let booking = state
        .bookings
        .lock_slot(req.slot_id, &claims.sub, ttl)
        .await?;

    info!(
        booking_id = %booking.id,
        slot_id = %req.slot_id,
        holder = %MaskedEmail::from(claims.sub),
        "slot lock acquired"
    );

    Ok(Json(json!({ "ok": true, "booking": booking })))
}
