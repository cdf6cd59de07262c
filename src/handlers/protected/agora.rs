use axum::extract::{Query, State};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::agora;
use crate::error::ApiError;
use crate::middleware::auth::require_user;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::Participant;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub channel: Option<String>,
    pub uid: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBody {
    pub token: String,
    pub app_id: String,
    pub channel: String,
    pub uid: String,
    pub expires_in: u64,
}

/// GET /api/agora/token?channel=&uid= - Mint a video credential
///
/// Parameter presence is checked before the bearer: missing channel/uid is a
/// 400 no matter the auth state, which is why this route gates itself
/// instead of sitting behind the auth layer.
pub async fn token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TokenQuery>,
) -> ApiResult<TokenBody> {
    let channel = query
        .channel
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("channel is required"))?
        .to_string();
    let uid = query
        .uid
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("uid is required"))?
        .to_string();

    let user = require_user(&state, &headers).await?;

    let participant = Participant::from_uid(&uid)?;
    let profile = state.profiles.get(user.id).await?;
    if participant.role != profile.role {
        return Err(ApiError::forbidden("uid role does not match caller role"));
    }

    // The channel must name one of the caller's joinable sessions.
    let session = state
        .sessions
        .find_by_channel(user.id, profile.role, &channel)
        .await?;

    let token = state
        .rtc
        .issue(&session.agora_channel, &participant.uid(), agora::now_secs())?;

    Ok(ApiResponse::success(TokenBody {
        token,
        app_id: state.rtc.app_id().to_string(),
        channel: session.agora_channel,
        uid: participant.uid(),
        expires_in: state.rtc.ttl().as_secs(),
    }))
}
