use axum::extract::{Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::Practitioner;
use crate::services::practitioner_service::PractitionerFilter;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PractitionerQuery {
    /// `?online=true` restricts to rows with `isOnline` set.
    pub online: Option<bool>,
    pub id: Option<Uuid>,
}

/// GET /api/practitioners - Directory listing, best-rated first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PractitionerQuery>,
) -> ApiResult<Vec<Practitioner>> {
    let filter = PractitionerFilter {
        online_only: query.online.unwrap_or(false),
        id: query.id,
    };
    Ok(ApiResponse::success(state.practitioners.list(filter).await?))
}
