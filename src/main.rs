mod app;
mod auth;
mod config;
mod db;
mod error;
mod recipes;
mod session;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "recipebox=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;
    db::migrate(&app_state.db).await?;

    let purged = session::store::purge_expired(&app_state.db).await?;
    if purged > 0 {
        tracing::info!(purged, "expired sessions removed");
    }

    let addr = format!("{}:{}", app_state.config.host, app_state.config.port);
    app::serve(app::build_app(app_state), &addr).await
}
