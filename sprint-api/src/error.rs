use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sprint_core::error::ReservationError;

#[derive(Debug)]
pub enum ApiError {
    Reservation(ReservationError),
    Unauthorized(String),
    Internal(anyhow::Error),
}

impl ApiError {
    /// Wire-level error code plus HTTP status for each failure.
    pub fn code_and_status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Reservation(err) => match err {
                ReservationError::SlotUnavailable(_) => (StatusCode::CONFLICT, "SLOT_UNAVAILABLE"),
                ReservationError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
                ReservationError::InvalidCode => (StatusCode::UNAUTHORIZED, "INVALID_CODE"),
                ReservationError::BookingNotLocked(_) => {
                    (StatusCode::CONFLICT, "BOOKING_NOT_LOCKED")
                }
                ReservationError::BookingExpired(_) => (StatusCode::GONE, "BOOKING_EXPIRED"),
                ReservationError::Gateway(_) => (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR"),
                ReservationError::SignatureInvalid => {
                    (StatusCode::UNAUTHORIZED, "SIGNATURE_INVALID")
                }
                ReservationError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                ReservationError::InvalidTransition { .. } => {
                    (StatusCode::CONFLICT, "INVALID_TRANSITION")
                }
                ReservationError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ReservationError::Storage(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn message(&self) -> String {
        match self {
            // Storage details stay in the logs, not the response.
            ApiError::Reservation(ReservationError::Storage(_)) | ApiError::Internal(_) => {
                "Internal Server Error".to_string()
            }
            ApiError::Reservation(err) => err.to_string(),
            ApiError::Unauthorized(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.code_and_status();

        match &self {
            ApiError::Reservation(ReservationError::Storage(msg)) => {
                tracing::error!("Storage error: {}", msg);
            }
            ApiError::Internal(err) => {
                tracing::error!("Internal Server Error: {}", err);
            }
            _ => {}
        }

        let body = Json(json!({
            "ok": false,
            "error": code,
            "message": self.message(),
        }));

        (status, body).into_response()
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        Self::Reservation(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn taxonomy_maps_to_expected_codes() {
        let cases: Vec<(ApiError, StatusCode, &str)> = vec![
            (
                ReservationError::SlotUnavailable(Uuid::new_v4()).into(),
                StatusCode::CONFLICT,
                "SLOT_UNAVAILABLE",
            ),
            (
                ReservationError::RateLimited.into(),
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
            ),
            (
                ReservationError::InvalidCode.into(),
                StatusCode::UNAUTHORIZED,
                "INVALID_CODE",
            ),
            (
                ReservationError::BookingExpired(Uuid::new_v4()).into(),
                StatusCode::GONE,
                "BOOKING_EXPIRED",
            ),
            (
                ReservationError::SignatureInvalid.into(),
                StatusCode::UNAUTHORIZED,
                "SIGNATURE_INVALID",
            ),
            (
                ReservationError::Gateway("down".to_string()).into(),
                StatusCode::BAD_GATEWAY,
                "GATEWAY_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.code_and_status(), (status, code));
        }
    }

    #[test]
    fn storage_detail_is_not_leaked() {
        let err: ApiError = ReservationError::Storage("pg password in DSN".to_string()).into();
        assert_eq!(err.message(), "Internal Server Error");
    }
}
