use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Installs the global subscriber. `RUST_LOG` overrides `LOG_LEVEL` when set.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = env_filter(config);
    let installed = if config.json_logs() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };
    installed.map_err(|e| anyhow::anyhow!(e))
}

fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(&config.log_level)))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn default_directives(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    format!("users_backend={level},seed={level},tower_http=warn,sqlx=warn")
}
