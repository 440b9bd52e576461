use std::sync::Arc;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod state;
mod users;

use crate::{config::AppConfig, state::AppState, users::PgUserStore};

/// `RUST_LOG` picks the filter; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "accounts=debug,axum=info,tower_http=info".to_string());
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.with_target(false).json().init(),
        _ => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Arc::new(AppConfig::from_env()?);
    if config.jwt.secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; logins will fail until it is configured");
    }

    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    let addr = config.listen_addr;
    let state = AppState::from_parts(Arc::new(PgUserStore::new(pool.clone())), config);
    let result = app::serve(app::build_app(state), addr).await;

    pool.close().await;
    tracing::info!("database pool closed");
    result
}
