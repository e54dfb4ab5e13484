use std::sync::Arc;

use tasks_api::application::cache::TaskCache;
use tasks_api::application::task_service::TaskServiceImpl;
use tasks_api::config::Config;
use tasks_api::domain::repository::TaskRepository;
use tasks_api::http::auth::GatewayHeader;
use tasks_api::http::routing::{self, tasks};
use tasks_api::infrastructure::sqlite_repo::SqliteTaskRepository;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    let repo = SqliteTaskRepository::connect(&config.database_url, config.db_max_connections).await?;
    repo.init().await?;
    let cache = Arc::new(TaskCache::new(config.cache_ttl));
    let service = TaskServiceImpl::new(repo.clone(), cache.clone()).with_max_limit(config.max_page_size);
    let tasks_router = tasks::router(tasks::AppState { service, auth: Arc::new(GatewayHeader) });
    let router = routing::app(tasks_router);

    let addr = config.addr()?;
    tracing::info!(%addr, database_url = %config.database_url, cache_ttl_secs = cache.ttl().as_secs(), "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache.clear().await;
    repo.close().await;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
