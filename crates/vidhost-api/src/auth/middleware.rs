use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::models::{Caller, JwtClaims};
use crate::error::HttpAppError;
use crate::state::AppState;
use vidhost_core::AppError;

fn unauthorized(msg: &str) -> Response {
    HttpAppError(AppError::Unauthorized(msg.to_string())).into_response()
}

/// Validate the bearer credential and expose the caller identity.
///
/// Rejects with 401 before the body is read; no staging or tool invocation
/// happens for unauthenticated requests.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => return unauthorized("Missing authorization header"),
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(t) => t.trim(),
        None => return unauthorized("Authorization header must use the Bearer scheme"),
    };

    let claims = match decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::debug!(error = %e, "JWT validation failed");
            return unauthorized("Invalid or expired token");
        }
    };

    request.extensions_mut().insert(Caller {
        user_id: claims.sub,
    });

    next.run(request).await
}

/// Issue an HS256 token for `user_id`. Token issuance belongs to the
/// external auth system; this helper exists for tests and local tooling.
pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = JwtClaims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
