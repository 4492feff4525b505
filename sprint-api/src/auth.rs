use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sprint_core::error::ReservationError;
use sprint_core::otp::OtpChallenge;
use sprint_shared::MaskedEmail;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::middleware::auth::{mint_token, SessionClaims, ROLE_BOOKER};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RequestOtpBody {
    email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpBody {
    email: String,
    code: String,
}

fn normalize_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    // Deliverability is the mailer's problem; this only rejects garbage.
    if email.len() < 3 || !email.contains('@') || email.contains(char::is_whitespace) {
        return Err(ReservationError::Validation("a valid email is required".to_string()).into());
    }
    Ok(email)
}

/// POST /api/auth/request-otp
pub async fn request_otp(
    State(state): State<AppState>,
    Json(body): Json<RequestOtpBody>,
) -> Result<Json<Value>, ApiError> {
    let email = normalize_email(&body.email)?;
    let rules = &state.business_rules;

    let key = format!("otp:req:{}", email);
    let allowed = state
        .redis
        .check_rate_limit(&key, rules.otp_max_requests, rules.otp_window_seconds)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    if !allowed {
        warn!(email = %MaskedEmail::from(email.clone()), "OTP request rate limited");
        return Err(ReservationError::RateLimited.into());
    }

    let challenge = OtpChallenge::issue(email.clone(), rules.otp_ttl_seconds as i64);
    state.otps.store_challenge(&challenge).await?;

    let recipient = MaskedEmail::from(email);
    let ttl_minutes = (rules.otp_ttl_seconds / 60).max(1) as i64;
    if let Err(err) = state
        .mailer
        .send_otp(&recipient, &challenge.code, ttl_minutes)
        .await
    {
        // A code the user never received must not stay verifiable.
        if let Err(cleanup) = state.otps.discard_challenge(challenge.id).await {
            warn!("Failed to discard undelivered OTP challenge: {}", cleanup);
        }
        return Err(err.into());
    }

    Ok(Json(json!({ "ok": true })))
}

/// POST /api/auth/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpBody>,
) -> Result<Json<Value>, ApiError> {
    let email = normalize_email(&body.email)?;
    let code = body.code.trim();

    let consumed = state.otps.consume_challenge(&email, code).await?;
    if !consumed {
        return Err(ReservationError::InvalidCode.into());
    }

    let claims = SessionClaims {
        sub: email.clone(),
        role: ROLE_BOOKER.to_string(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };
    let token = mint_token(&claims, &state.auth.secret)?;

    info!(email = %MaskedEmail::from(email), "session established");
    Ok(Json(json!({ "ok": true, "token": token })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(
            normalize_email("  Jordan@Example.COM ").unwrap(),
            "jordan@example.com"
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_email("").is_err());
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("a b@example.com").is_err());
    }
}
