use axum::extract::{Extension, Json, Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::{Phase, Role, Session};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub practitioner_id: Uuid,
}

/// POST /api/sessions - Guest requests a practitioner
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<Session> {
    let profile = state.profiles.get(user.id).await?;
    if profile.role != Role::Guest {
        return Err(ApiError::forbidden("only guests may request sessions"));
    }

    let session = state.sessions.create(user.id, req.practitioner_id).await?;
    Ok(ApiResponse::created(session))
}

#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    /// Comma-separated phase set, e.g. `?phase=waiting,live`.
    pub phase: Option<String>,
}

/// GET /api/sessions - The caller's sessions, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SessionListQuery>,
) -> ApiResult<Vec<Session>> {
    let phases = parse_phases(query.phase.as_deref())?;
    let profile = state.profiles.get(user.id).await?;

    let sessions = state
        .sessions
        .list_for(user.id, profile.role, &phases)
        .await?;
    Ok(ApiResponse::success(sessions))
}

/// GET /api/sessions/:id - Participant-scoped read
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Session> {
    Ok(ApiResponse::success(
        state.sessions.get_for(id, user.id).await?,
    ))
}

/// POST /api/sessions/:id/accept - Practitioner accepts: waiting → live
pub async fn accept(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Session> {
    Ok(ApiResponse::success(
        state.sessions.accept(id, user.id).await?,
    ))
}

/// POST /api/sessions/:id/end - Either participant ends: → ended
pub async fn end(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Session> {
    Ok(ApiResponse::success(state.sessions.end(id, user.id).await?))
}

fn parse_phases(raw: Option<&str>) -> Result<Vec<Phase>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.parse().map_err(|e: String| ApiError::bad_request(e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_phase_sets() {
        assert_eq!(
            parse_phases(Some("waiting,live")).unwrap(),
            vec![Phase::Waiting, Phase::Live]
        );
        assert_eq!(parse_phases(None).unwrap(), Vec::<Phase>::new());
    }

    #[test]
    fn rejects_unknown_phase() {
        assert!(parse_phases(Some("waiting_room")).is_err());
    }
}
