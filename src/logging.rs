use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global tracing subscriber. `RUST_LOG` wins over the config
/// section when set.
pub fn init(config: Option<&LoggingConfig>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = config
            .and_then(|c| c.filters.clone())
            .or_else(|| config.and_then(|c| c.level.clone()))
            .unwrap_or_else(|| "info".to_string());
        EnvFilter::new(directives)
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
