use axum::extract::{Extension, Json, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::supabase::SignedUpload;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarUploadRequest {
    pub file_name: String,
}

/// POST /api/upload/avatar - Grant a one-shot avatar upload
///
/// Returns the signed upload URL plus the public URL the avatar will be
/// served from. The object path is namespaced by caller id.
pub async fn avatar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<AvatarUploadRequest>,
) -> ApiResult<SignedUpload> {
    if req.file_name.trim().is_empty() {
        return Err(ApiError::bad_request("fileName is required"));
    }

    let path = format!(
        "{}/{}.{}",
        user.id,
        Uuid::new_v4().simple(),
        extension_of(&req.file_name)
    );
    Ok(ApiResponse::success(state.storage.signed_upload(&path).await?))
}

/// File extension, restricted to a safe alphanumeric form.
fn extension_of(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "png".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_known_extensions() {
        assert_eq!(extension_of("me.JPG"), "jpg");
        assert_eq!(extension_of("avatar.png"), "png");
    }

    #[test]
    fn falls_back_on_odd_names() {
        assert_eq!(extension_of("noext"), "png");
        assert_eq!(extension_of("weird.p/ng"), "png");
        assert_eq!(extension_of("trailing."), "png");
    }
}
