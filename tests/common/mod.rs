use axum::{body::Body, response::Response, Router};
use serde_json::Value;
use url::Url;

use parley_api::config::{AgoraConfig, AppConfig, ServerConfig, SupabaseConfig};
use parley_api::routes;
use parley_api::state::AppState;

/// Router wired to unroutable upstream addresses.
///
/// The contracts exercised here (parameter-before-auth ordering, bearer
/// gating, envelopes, response headers) all short-circuit before any
/// upstream call is made.
pub fn app() -> Router {
    let config = AppConfig {
        server: ServerConfig { port: 0 },
        supabase: SupabaseConfig {
            url: Url::parse("http://127.0.0.1:1").expect("url"),
            anon_key: "test-anon".into(),
            service_role_key: "test-service".into(),
            avatar_bucket: "avatars".into(),
        },
        agora: AgoraConfig {
            app_id: "test-app".into(),
            app_certificate: "0123456789abcdef0123456789abcdef".into(),
            token_ttl_secs: 3600,
        },
    };
    let state = AppState::new(config).expect("app state");
    routes::app(state)
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
