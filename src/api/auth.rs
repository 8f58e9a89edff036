//! Credentials, tokens, and the authentication middleware.
//!
//! Passwords are hashed with Argon2; the PHC string embeds its own salt
//! and parameters, so verification needs nothing beyond the hash itself.
//! Access tokens are HS256 JWTs with a 7-day expiry. Each login also
//! writes a session row keyed by the SHA-256 of the token; requests
//! authenticate only while that row is present and unexpired, so
//! individual logins can be listed and revoked.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    LoginRequest, LoginResponse, LoginUser, Role, SessionResponse, UserResponse, UserStatus,
};
use crate::AppState;

use super::error::ApiError;
use super::validation::validate_login_request;
use super::ApiResponse;

/// Token lifetime; the session row carries the same expiry.
const TOKEN_TTL_DAYS: i64 = 7;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash. Never errors on mismatch; a
/// malformed hash also verifies to false.
pub fn verify_password(hash: &str, password: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Signed claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id.
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Create a signed access token for a user.
pub fn create_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
    role: Role,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id,
        email: email.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token. Returns None on any failure: bad signature, expiry,
/// malformed input.
pub fn verify_token(secret: &str, token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    jsonwebtoken::decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .ok()
}

/// Extract the token from an Authorization header value. Accepts both
/// "Bearer <token>" and a bare token.
pub fn extract_token(header: Option<&str>) -> Option<&str> {
    let header = header?.trim();
    if header.is_empty() {
        return None;
    }
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Some(token),
        Some(_) => None,
        None => Some(header),
    }
}

/// SHA-256 hex of a token, as stored on the session row.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    extract_token(headers.get("Authorization").and_then(|h| h.to_str().ok()))
}

/// Identity attached to the request once authentication succeeds.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<TokenClaims> for AuthUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Full authentication: a valid signature alone is not enough, the
/// token's session row must still exist and be unexpired. Logout and
/// revocation therefore take effect immediately.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token =
        bearer_token(headers).ok_or_else(|| ApiError::unauthorized("No token provided"))?;

    let claims = verify_token(&state.config.auth.jwt_secret, token)
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    state
        .sessions
        .find_live_by_token_hash(&hash_token(token))
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    Ok(AuthUser::from(claims))
}

/// Required-auth middleware: no token and invalid token both
/// short-circuit with 401; otherwise the identity is attached to the
/// request extensions for downstream handlers and layers.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Role-gate middleware: composes on top of `require_auth` and rejects
/// identities whose role is outside the allow-list.
pub async fn require_role(
    allowed: &'static [Role],
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !allowed.contains(&user.role) {
        return Err(ApiError::forbidden("Insufficient permissions"));
    }

    Ok(next.run(request).await)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Populated by require_auth when the route is behind the layer.
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        authenticate(state, &parts.headers).await
    }
}

/// Optional-auth extractor: Some when a valid token is present, None
/// otherwise. Never rejects.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await.ok();
        Ok(OptionalAuthUser(user))
    }
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-Forwarded-For")
        .or_else(|| headers.get("X-Real-IP"))
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let (email, password) = validate_login_request(&request)?;

    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Email or password is incorrect"))?;

    if user.status != UserStatus::Active {
        return Err(ApiError::forbidden(
            "Your account has been disabled. Please contact support.",
        ));
    }

    if !verify_password(&user.password_hash, password) {
        return Err(ApiError::unauthorized("Email or password is incorrect"));
    }

    let token = create_token(&state.config.auth.jwt_secret, user.id, &user.email, user.role)
        .map_err(|e| {
            tracing::error!("Failed to sign token: {}", e);
            ApiError::internal("Login failed")
        })?;

    state.users.touch_last_login(user.id).await?;

    let user_agent = headers
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let expires_at = Utc::now() + Duration::days(TOKEN_TTL_DAYS);
    state
        .sessions
        .create(
            user.id,
            &hash_token(&token),
            user_agent.as_deref(),
            client_ip(&headers).as_deref(),
            expires_at,
        )
        .await?;

    let response = LoginResponse {
        token,
        user: LoginUser::from(&user),
    };
    Ok(Json(ApiResponse::with_message(response, "Login successful")))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.delete_by_token_hash(&hash_token(token)).await?;
    }
    Ok(Json(ApiResponse::message("Logout successful")))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let record = state
        .users
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(ApiResponse::ok(UserResponse::from(record))))
}

/// GET /api/auth/sessions
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<SessionResponse>>>, ApiError> {
    let current_hash = bearer_token(&headers).map(hash_token);

    let sessions = state.sessions.list_for_user(user.user_id).await?;
    let sessions = sessions
        .into_iter()
        .map(|s| SessionResponse {
            id: s.id,
            user_agent: s.user_agent,
            ip_address: s.ip_address,
            created_at: s.created_at,
            expires_at: s.expires_at,
            is_current: current_hash.as_deref() == Some(s.token_hash.as_str()),
        })
        .collect();

    Ok(Json(ApiResponse::ok(sessions)))
}

/// DELETE /api/auth/sessions/:id
///
/// 404 both when the session does not exist and when it belongs to
/// another user; the caller cannot probe other people's sessions.
pub async fn revoke_session(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let deleted = state.sessions.delete_owned(id, user.user_id).await?;
    if !deleted {
        return Err(ApiError::not_found("Session not found"));
    }
    Ok(Json(ApiResponse::message("Session revoked successfully")))
}

/// Create the seed admin account on startup when it does not exist yet.
pub async fn ensure_admin_user(state: &AppState) -> anyhow::Result<()> {
    let password_hash = hash_password(&state.config.auth.admin_password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;

    let created = state
        .users
        .ensure_admin(&state.config.auth.admin_email, &password_hash)
        .await?;
    if created {
        tracing::info!("Created admin user {}", state.config.auth.admin_email);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password(&hash, "correct horse battery staple"));
        assert!(!verify_password(&hash, "wrong password"));
    }

    #[test]
    fn test_verify_password_malformed_hash() {
        assert!(!verify_password("not-a-phc-string", "whatever"));
        assert!(!verify_password("", "whatever"));
    }

    #[test]
    fn test_hashes_embed_unique_salts() {
        let a = hash_password("same input").unwrap();
        let b = hash_password("same input").unwrap();
        assert_ne!(a, b);
        assert!(verify_password(&a, "same input"));
        assert!(verify_password(&b, "same input"));
    }

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = create_token("secret", user_id, "a@b.com", Role::ContentManager).unwrap();
        let claims = verify_token("secret", &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, Role::ContentManager);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_DAYS * 24 * 3600);
    }

    #[test]
    fn test_token_wrong_secret_fails() {
        let token = create_token("secret", Uuid::new_v4(), "a@b.com", Role::Viewer).unwrap();
        assert!(verify_token("other-secret", &token).is_none());
    }

    #[test]
    fn test_token_garbage_fails() {
        assert!(verify_token("secret", "not.a.jwt").is_none());
        assert!(verify_token("secret", "").is_none());
    }

    #[test]
    fn test_expired_token_fails() {
        // Build a token whose exp is already in the past
        let now = Utc::now();
        let claims = TokenClaims {
            sub: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            role: Role::Admin,
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(verify_token("secret", &token).is_none());
    }

    #[test]
    fn test_extract_token_variants() {
        assert_eq!(extract_token(Some("Bearer abc123")), Some("abc123"));
        assert_eq!(extract_token(Some("abc123")), Some("abc123"));
        assert_eq!(extract_token(Some("")), None);
        assert_eq!(extract_token(Some("Bearer ")), None);
        assert_eq!(extract_token(None), None);
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let a = hash_token("some-token");
        let b = hash_token("some-token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, hash_token("other-token"));
    }

    #[tokio::test]
    async fn test_require_role_gates_by_role() {
        use axum::{body::Body, http::Request as HttpRequest, middleware, routing::get, Router};
        use tower::ServiceExt;

        async fn handler() -> &'static str {
            "ok"
        }

        fn app_for(role: Role) -> Router {
            Router::new()
                .route("/", get(handler))
                .layer(middleware::from_fn(|req, next| {
                    require_role(&[Role::Admin, Role::ContentManager], req, next)
                }))
                .layer(middleware::from_fn(move |mut req: Request, next: Next| async move {
                    req.extensions_mut().insert(AuthUser {
                        user_id: Uuid::new_v4(),
                        email: "user@example.com".to_string(),
                        role,
                    });
                    next.run(req).await
                }))
        }

        let response = app_for(Role::Viewer)
            .oneshot(HttpRequest::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);

        let response = app_for(Role::ContentManager)
            .oneshot(HttpRequest::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
