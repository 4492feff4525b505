use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sprint_core::booking::{Booking, BookingStatus, ConfirmOutcome};
use sprint_core::error::ReservationError;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::SessionClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    slot_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    ok: bool,
    key_id: String,
    amount: i64,
    currency: String,
    order_id: String,
    booking_id: Uuid,
}

/// The checkout callback posts the booking id in camelCase and the
/// gateway fields under their literal names.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(rename = "bookingId")]
    booking_id: Uuid,
    razorpay_order_id: String,
    razorpay_payment_id: String,
    razorpay_signature: String,
}

/// POST /api/razorpay/order
///
/// Requires a live LOCKED booking owned by the caller on the slot. The
/// gateway order is created first; the reference is persisted only on
/// success, so an upstream failure leaves the booking untouched.
pub async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(req): Json<OrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let booking = resolve_locked_booking(&state, req.slot_id, &claims.sub).await?;

    let rules = &state.business_rules;
    let order = state
        .gateway
        .create_order(booking.id, rules.price_paise, &rules.currency, &booking.code)
        .await?;

    state
        .bookings
        .attach_payment_order(booking.id, &claims.sub, &order.id)
        .await?;

    info!(booking_id = %booking.id, order_id = %order.id, "payment order attached");

    Ok(Json(OrderResponse {
        ok: true,
        key_id: state.gateway.key_id().to_string(),
        amount: order.amount,
        currency: order.currency,
        order_id: order.id,
        booking_id: booking.id,
    }))
}

async fn resolve_locked_booking(
    state: &AppState,
    slot_id: Uuid,
    email: &str,
) -> Result<Booking, ApiError> {
    if let Some(booking) = state.bookings.live_lock_for_slot(slot_id, email).await? {
        return Ok(booking);
    }

    // No live lock: distinguish an elapsed TTL from a wrong-state booking.
    match state.bookings.latest_for_email(email).await? {
        Some(b)
            if b.slot_id == slot_id
                && (b.lock_expired(Utc::now()) || b.status == BookingStatus::Cancelled) =>
        {
            Err(ReservationError::BookingExpired(b.id).into())
        }
        Some(b) if b.slot_id == slot_id => Err(ReservationError::BookingNotLocked(b.id).into()),
        _ => Err(ReservationError::NotFound("locked booking").into()),
    }
}

/// POST /api/razorpay/verify
///
/// Validates the checkout signature against the stored order reference,
/// then compare-and-sets LOCKED -> CONFIRMED. Replaying the same valid
/// signature is a no-op success; nothing is ever double-confirmed.
pub async fn verify_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<Value>, ApiError> {
    let booking = state
        .bookings
        .get_booking(req.booking_id)
        .await?
        .ok_or(ReservationError::NotFound("booking"))?;
    if booking.email != claims.sub {
        return Err(ReservationError::NotFound("booking").into());
    }

    // The signature must bind to the order this booking actually holds.
    if booking.payment_order_ref.as_deref() != Some(req.razorpay_order_id.as_str()) {
        return Err(ReservationError::SignatureInvalid.into());
    }
    if !state.gateway.verify_signature(
        &req.razorpay_order_id,
        &req.razorpay_payment_id,
        &req.razorpay_signature,
    ) {
        return Err(ReservationError::SignatureInvalid.into());
    }

    let outcome = state
        .bookings
        .confirm_paid(booking.id, &req.razorpay_order_id, &req.razorpay_payment_id)
        .await?;

    match outcome {
        ConfirmOutcome::Confirmed => {
            info!(booking_id = %booking.id, "booking confirmed");
        }
        ConfirmOutcome::AlreadyConfirmed => {
            info!(booking_id = %booking.id, "repeat verification, already confirmed");
        }
    }

    Ok(Json(json!({ "ok": true })))
}
