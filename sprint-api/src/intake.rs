use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};
use sprint_core::intake::IntakeSubmission;
use tracing::info;

use crate::error::ApiError;
use crate::middleware::auth::SessionClaims;
use crate::state::AppState;

/// POST /api/sprint/intake
///
/// Requires a CONFIRMED (or already INTAKE_SUBMITTED) booking owned by
/// the caller. Resubmission overwrites the existing record.
pub async fn submit_intake(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(submission): Json<IntakeSubmission>,
) -> Result<Json<Value>, ApiError> {
    submission.validate()?;

    let booking = state.intakes.upsert_intake(&submission, &claims.sub).await?;

    info!(booking_id = %booking.id, "intake stored");
    Ok(Json(json!({ "ok": true, "booking": booking })))
}
