//! Admin authentication extractor and routes

use axum::{
    extract::{FromRef, FromRequestParts, State},
    http::{
        header::{AUTHORIZATION, COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use keepsake_auth::{verify_password, AuthAdmin, ADMIN_TOKEN_COOKIE};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::routes::types::{AdminInfo, LoginRequest, LoginResponse, VerifyResponse};
use crate::state::AppState;

/// Maximum allowed account length
const MAX_ACCOUNT_LENGTH: usize = 64;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

// ==================== Auth Extractor ====================

/// Extractor for an authenticated admin (required)
pub struct RequireAdmin(pub AuthAdmin);

/// Pull the admin token from the adminToken cookie, falling back to a
/// Bearer authorization header
fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(cookies) = parts.headers.get(COOKIE).and_then(|h| h.to_str().ok()) {
        for pair in cookies.split(';') {
            let mut split = pair.trim().splitn(2, '=');
            if split.next() == Some(ADMIN_TOKEN_COOKIE) {
                if let Some(value) = split.next() {
                    return Some(value.to_string());
                }
            }
        }
    }

    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = extract_token(parts).ok_or(ApiError::Unauthorized)?;
        let claims = app_state
            .jwt
            .validate_token(&token)
            .map_err(|_| ApiError::Unauthorized)?;
        let admin = AuthAdmin::from_claims(&claims);

        debug!("Authenticated admin: {}", admin.account);
        Ok(RequireAdmin(admin))
    }
}

// ==================== Auth Routes ====================

/// POST /api/admin/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if request.admin_account.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Admin account and password are required".to_string(),
        ));
    }
    if request.admin_account.len() > MAX_ACCOUNT_LENGTH
        || request.password.len() > MAX_PASSWORD_LENGTH
    {
        return Err(ApiError::BadRequest("Credentials too long".to_string()));
    }

    debug!("Login attempt for admin: {}", request.admin_account);

    // Find admin - but don't return early to prevent timing attacks
    let admin_result = state.db.get_admin_by_account(&request.admin_account).await?;

    // Always perform a verification; a dummy hash keeps the failure path
    // close to constant-time when the account doesn't exist
    const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

    let (hash_to_verify, admin) = match admin_result {
        Some(a) => (a.password_hash.clone(), Some(a)),
        None => (DUMMY_HASH.to_string(), None),
    };

    let password_valid = verify_password(&request.password, &hash_to_verify).unwrap_or(false);

    let admin = match (admin, password_valid) {
        (Some(a), true) => a,
        _ => return Err(ApiError::Unauthorized),
    };

    state.db.touch_admin_login(admin.id).await?;

    let token = state.jwt.generate_token(admin.id, &admin.account)?;
    let cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        ADMIN_TOKEN_COOKIE,
        token,
        state.jwt.expiry_seconds()
    );

    info!("Admin {} logged in successfully", admin.account);

    let body = Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        admin: AdminInfo {
            admin_account: admin.account,
            last_login: admin.last_login,
        },
    });

    Ok(([(SET_COOKIE, cookie)], body).into_response())
}

/// GET /api/admin/verify
async fn verify(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<VerifyResponse>, ApiError> {
    // The token is only as good as the account behind it
    let admin = state
        .db
        .get_admin_by_account(&auth.account)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(VerifyResponse {
        success: true,
        admin: AdminInfo {
            admin_account: admin.account,
            last_login: admin.last_login,
        },
    }))
}

/// Create admin auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/verify", get(verify))
}
