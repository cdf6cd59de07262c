use axum::extract::{Extension, State};

use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::Practitioner;
use crate::state::AppState;

/// POST /api/presence/heartbeat - Practitioner marks itself online
pub async fn heartbeat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Practitioner> {
    Ok(ApiResponse::success(
        state.practitioners.set_online(user.id, true).await?,
    ))
}

/// POST /api/presence/offline - Practitioner signs off
pub async fn offline(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Practitioner> {
    Ok(ApiResponse::success(
        state.practitioners.set_online(user.id, false).await?,
    ))
}
