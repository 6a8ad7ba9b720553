use std::net::SocketAddr;
use std::sync::Arc;

use eventbuddy_api::config::AppConfig;
use eventbuddy_api::store::PgStore;
use eventbuddy_api::{routes, AppState, SERVICE_NAME};
use eventbuddy_shared::clients::db::create_pool;
use eventbuddy_shared::clients::redis::RedisClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    eventbuddy_shared::middleware::init_tracing(SERVICE_NAME);

    let config = AppConfig::load()?;
    let port = config.port;

    let pool = create_pool(&config.database_url, config.db_pool_size)?;
    let metrics_handle = eventbuddy_shared::middleware::init_metrics()?;

    let redis = match config.redis_url.as_deref() {
        Some(url) => Some(RedisClient::connect(url).await?),
        None => {
            tracing::warn!("no redis url configured, rate limiting disabled");
            None
        }
    };

    let mut state = AppState::new(config, Arc::new(PgStore::new(pool))).with_metrics(metrics_handle);
    if let Some(redis) = redis {
        state = state.with_redis(redis);
    }

    let app = routes::router(Arc::new(state));

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "eventbuddy-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
