//! Password sign-in and JWT cookie auth (single user).
//!
//! - The frontend submits the password to `/api/signin`
//! - The server returns a JWT (also set as the `token` cookie)
//! - When `TODO_PASSWORD` is set, protected endpoints require the token in
//!   the `token` cookie or an `Authorization: Bearer <jwt>` header
//!
//! The token carries a hash of the password it was issued for, so changing
//! the password invalidates every outstanding token.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::error::ApiError;
use super::routes::AppState;
use super::types::{SignInRequest, SignInResponse};
use crate::config::AuthConfig;

/// Name of the cookie holding the JWT.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    /// Subject (we only need a stable sentinel)
    sub: String,
    /// Issued-at unix seconds
    iat: i64,
    /// Expiration unix seconds
    exp: i64,
    /// SHA-256 of the password the token was issued for
    pwd: String,
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();
    if a_bytes.len() != b_bytes.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a_bytes.iter().zip(b_bytes) {
        diff |= x ^ y;
    }
    diff == 0
}

fn password_hash(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn issue_jwt(auth: &AuthConfig, password: &str) -> anyhow::Result<(String, i64)> {
    let secret = auth
        .signing_secret()
        .ok_or_else(|| anyhow::anyhow!("JWT secret not configured"))?;
    let now = Utc::now();
    let ttl = Duration::hours(auth.jwt_ttl_hours.max(1));
    let claims = Claims {
        sub: "task_scheduler".to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        pwd: password_hash(password),
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, ttl.num_seconds()))
}

fn verify_jwt(token: &str, auth: &AuthConfig) -> anyhow::Result<()> {
    let secret = auth
        .signing_secret()
        .ok_or_else(|| anyhow::anyhow!("JWT secret not configured"))?;
    let password = auth.password.as_deref().unwrap_or("");
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    if !constant_time_eq(&token_data.claims.pwd, &password_hash(password)) {
        anyhow::bail!("token was issued for a different password");
    }
    Ok(())
}

/// Pull the token from the `token` cookie, falling back to a bearer header.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string());

    from_cookie
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
                .map(|t| t.trim().to_string())
        })
        .filter(|t| !t.is_empty())
}

/// POST /api/signin
pub async fn signin(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let auth = &state.config.auth;

    let expected = auth.password.as_deref().unwrap_or("");
    if expected.is_empty() {
        return Err(ApiError::BadRequest(
            "Authentication is not enabled".to_string(),
        ));
    }
    if !constant_time_eq(&req.password, expected) {
        tracing::warn!("Rejected sign-in attempt with wrong password");
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }

    let (token, max_age) =
        issue_jwt(auth, expected).map_err(|e| ApiError::Internal(e.to_string()))?;

    let cookie = format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Strict",
        TOKEN_COOKIE, token, max_age
    );
    let mut response = Json(SignInResponse { token }).into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let auth = &state.config.auth;
    if !auth.auth_required() {
        return next.run(req).await;
    }

    let Some(token) = extract_token(req.headers()) else {
        return ApiError::Unauthorized("Authentication required".to_string()).into_response();
    };

    match verify_jwt(&token, auth) {
        Ok(()) => next.run(req).await,
        Err(e) => {
            tracing::debug!("Token rejected: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string()).into_response()
        }
    }
}
