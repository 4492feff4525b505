use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Claims of a signed, expiring session token minted by verify-otp. The
/// subject is the verified email; there is no server-side session state.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

pub const ROLE_BOOKER: &str = "BOOKER";

pub fn mint_token(claims: &SessionClaims, secret: &str) -> Result<String, ApiError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))
}

pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Malformed Authorization header".to_string()))?;

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized("Invalid or expired session".to_string()))?;

    if token_data.claims.role != ROLE_BOOKER {
        return Err(ApiError::Unauthorized("Wrong session role".to_string()));
    }

    req.extensions_mut().insert(token_data.claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn token_round_trip() {
        let secret = "test-secret";
        let claims = SessionClaims {
            sub: "a@example.com".to_string(),
            role: ROLE_BOOKER.to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };

        let token = mint_token(&claims, secret).unwrap();
        let decoded = decode::<SessionClaims>(
            &token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, "a@example.com");
        assert_eq!(decoded.claims.role, ROLE_BOOKER);
    }

    #[test]
    fn wrong_secret_fails_decode() {
        let claims = SessionClaims {
            sub: "a@example.com".to_string(),
            role: ROLE_BOOKER.to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };

        let token = mint_token(&claims, "secret-one").unwrap();
        let result = decode::<SessionClaims>(
            &token,
            &DecodingKey::from_secret(b"secret-two"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn expired_token_fails_decode() {
        let secret = "test-secret";
        let claims = SessionClaims {
            sub: "a@example.com".to_string(),
            role: ROLE_BOOKER.to_string(),
            exp: (Utc::now() - Duration::hours(1)).timestamp() as usize,
        };

        let token = mint_token(&claims, secret).unwrap();
        let result = decode::<SessionClaims>(
            &token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        );
        assert!(result.is_err());
    }
}
