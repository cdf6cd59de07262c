use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::{auth, response};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/sessions",
            post(protected::sessions::create).get(protected::sessions::list),
        )
        .route("/api/sessions/:id", get(protected::sessions::get))
        .route("/api/sessions/:id/accept", post(protected::sessions::accept))
        .route("/api/sessions/:id/end", post(protected::sessions::end))
        .route("/api/upload/avatar", post(protected::upload::avatar))
        .route(
            "/api/profile",
            get(protected::profile::get).patch(protected::profile::update),
        )
        .route("/api/presence/heartbeat", post(protected::presence::heartbeat))
        .route("/api/presence/offline", post(protected::presence::offline))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .route("/api/auth/signup", post(public::auth::signup))
        .route("/api/auth/login", post(public::auth::login))
        .route("/api/practitioners", get(public::practitioners::list))
        // Gates itself: parameter checks precede the bearer check
        .route("/api/agora/token", get(protected::agora::token))
        .merge(protected_routes)
        // Global middleware
        .layer(middleware::from_fn(response::cache_defeat_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Parley API",
            "version": version,
            "description": "Backend-for-frontend for live video consultations",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/auth/signup, /api/auth/login (public)",
                "practitioners": "/api/practitioners[?online=true|?id=...] (public)",
                "sessions": "/api/sessions[/:id[/accept|/end]] (protected)",
                "agora": "/api/agora/token?channel=&uid= (protected)",
                "upload": "/api/upload/avatar (protected)",
                "profile": "/api/profile (protected)",
                "presence": "/api/presence/heartbeat, /api/presence/offline (protected)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    let probe: Result<Vec<Value>, _> = state
        .db
        .from("profiles")
        .select("id")
        .limit(1)
        .fetch()
        .await;

    match probe {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "databaseError": e.to_string()
                }
            })),
        ),
    }
}
