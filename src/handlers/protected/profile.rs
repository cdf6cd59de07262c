use axum::extract::{Extension, Json, State};
use serde::Deserialize;

use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::Profile;
use crate::services::profile_service::ProfilePatch;
use crate::state::AppState;

/// GET /api/profile - The caller's own profile
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Profile> {
    Ok(ApiResponse::success(state.profiles.get(user.id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// PATCH /api/profile - Update displayName / avatarUrl
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ProfileUpdateRequest>,
) -> ApiResult<Profile> {
    let patch = ProfilePatch {
        display_name: req.display_name,
        avatar_url: req.avatar_url,
    };
    Ok(ApiResponse::success(state.profiles.update(user.id, patch).await?))
}
