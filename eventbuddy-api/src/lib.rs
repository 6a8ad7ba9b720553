use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use eventbuddy_shared::clients::redis::RedisClient;
use eventbuddy_shared::middleware::{JwtProvider, JwtVerifier};

pub mod config;
pub mod matching;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod schema;
pub mod services;
pub mod social;
pub mod store;

use config::AppConfig;
use store::Store;

pub const SERVICE_NAME: &str = "eventbuddy-api";

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: AppConfig,
    pub jwt: JwtVerifier,
    /// Rate limiting is skipped when absent.
    pub redis: Option<RedisClient>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let jwt = JwtVerifier::new(&config.jwt_secret, config.jwt_audience());
        Self {
            store,
            config,
            jwt,
            redis: None,
            metrics_handle: None,
        }
    }

    pub fn with_redis(mut self, redis: RedisClient) -> Self {
        self.redis = Some(redis);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}

impl JwtProvider for AppState {
    fn jwt_verifier(&self) -> &JwtVerifier {
        &self.jwt
    }
}
