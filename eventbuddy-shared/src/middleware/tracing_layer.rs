use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines with file and line numbers.
    Pretty,
    /// One JSON object per event, for log shipping.
    Json,
}

impl LogFormat {
    /// `EVENTBUDDY_ENV=production` switches to JSON.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("production") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Fallback filter when `RUST_LOG` is unset: info everywhere, debug for
/// the service crate and tower-http.
pub fn default_filter(service_name: &str) -> String {
    format!("info,{}=debug,tower_http=debug", service_name.replace('-', "_"))
}

pub fn init_tracing(service_name: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(service_name)));
    let format = LogFormat::from_env_value(std::env::var("EVENTBUDDY_ENV").ok().as_deref());

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
    }

    tracing::info!(service = service_name, ?format, "tracing initialized");
}
