use std::sync::Arc;

use mockable::DefaultClock;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_backend::api::router;
use todo_backend::auth::TokenAuthenticator;
use todo_backend::config::AppConfig;
use todo_backend::db;
use todo_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "todo_backend=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = db::init_pool(&config.database_url, config.max_connections).await?;

    let state = AppState {
        db: pool.clone(),
        auth: Arc::new(TokenAuthenticator::new(pool.clone())),
        clock: Arc::new(DefaultClock),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
