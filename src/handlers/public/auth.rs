use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::{Profile, Role};
use crate::services::profile_service::{LoginOutcome, SignupOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupBody {
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl From<SignupOutcome> for SignupBody {
    fn from(outcome: SignupOutcome) -> Self {
        Self {
            profile: outcome.profile,
            access_token: outcome.access_token,
            expires_in: outcome.expires_in,
        }
    }
}

/// POST /api/auth/signup - Create an identity user and its profile
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<SignupBody> {
    if req.email.trim().is_empty() || req.password.is_empty() || req.display_name.trim().is_empty()
    {
        return Err(ApiError::bad_request(
            "email, password and displayName are required",
        ));
    }

    let outcome = state
        .profiles
        .signup(
            req.email.trim(),
            &req.password,
            req.display_name.trim(),
            req.role,
        )
        .await?;
    Ok(ApiResponse::created(outcome.into()))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub access_token: String,
    pub expires_in: u64,
    pub profile: Profile,
}

impl From<LoginOutcome> for LoginBody {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            access_token: outcome.access_token,
            expires_in: outcome.expires_in,
            profile: outcome.profile,
        }
    }
}

/// POST /api/auth/login - Password-grant login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginBody> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    let outcome = state.profiles.login(req.email.trim(), &req.password).await?;
    Ok(ApiResponse::success(outcome.into()))
}
