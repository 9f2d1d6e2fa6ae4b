//! Camp API server: reads settings from the environment (and `.env`), prepares the store, serves HTTP.

use camp_api::{
    app, apply_migrations, ensure_database_exists, seed, store, AppState, CampRepository,
    InMemoryCampRepository, PgCampRepository, Settings, StoreKind,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("camp_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;

    let repo: Arc<dyn CampRepository> = match settings.store {
        StoreKind::Postgres => {
            ensure_database_exists(&settings.database_url).await?;
            let pool = store::connect(&settings).await?;
            apply_migrations(&pool, &settings.schema).await?;
            Arc::new(PgCampRepository::new(pool, settings.schema.clone()))
        }
        StoreKind::Memory => {
            tracing::warn!("using the in-memory store; data is lost on exit");
            Arc::new(InMemoryCampRepository::new())
        }
    };
    if settings.seed_data {
        seed(repo.as_ref()).await?;
    }

    let router = app(AppState::new(repo), settings.body_limit_bytes);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
