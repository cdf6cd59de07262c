use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::supabase::identity::IdentityError;

/// Authenticated caller context, resolved through the identity provider and
/// injected into request extensions.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Request gate for protected routes: extract the bearer credential,
/// validate it upstream, short-circuit 401 on failure with no side effects.
/// Stateless and reentrant.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = require_user(&state, &headers).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// The gate as a callable, for handlers that must order their own parameter
/// validation ahead of authentication.
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = extract_bearer(headers).map_err(|msg| ApiError::unauthorized(msg))?;

    let user = state
        .identity
        .verify_bearer(&token)
        .await
        .map_err(|e| match e {
            IdentityError::Unauthorized => ApiError::unauthorized("bearer token rejected"),
            other => other.into(),
        })?;

    Ok(AuthUser {
        id: user.id,
        email: user.email,
    })
}

/// Extract the bearer token from the Authorization header.
fn extract_bearer(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(
            extract_bearer(&headers_with("Bearer abc.def")).unwrap(),
            "abc.def"
        );
    }

    #[test]
    fn rejects_missing_header() {
        assert!(extract_bearer(&HeaderMap::new()).is_err());
    }

    #[test]
    fn rejects_non_bearer_schemes_and_empty_tokens() {
        assert!(extract_bearer(&headers_with("Basic abc")).is_err());
        assert!(extract_bearer(&headers_with("Bearer ")).is_err());
    }
}
