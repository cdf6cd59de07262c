use parley_api::{config::AppConfig, routes, state::AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up SUPABASE_URL, AGORA_APP_ID, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Fail fast with the complete list of configuration problems
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let port = config.server.port;
    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("failed to construct service clients: {e:#}");
            std::process::exit(1);
        }
    };

    let app = routes::app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Parley API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
