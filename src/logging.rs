use tracing_subscriber::EnvFilter;

use crate::config::LoggingSection;

/// Filter directives: `RUST_LOG` wins, then the configured module levels,
/// then the plain level.
pub fn env_filter(cfg: &LoggingSection) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = match &cfg.module_levels {
        Some(m) if !m.is_empty() => format!("{},{}", cfg.level, m),
        _ => cfg.level.clone(),
    };
    Ok(EnvFilter::try_new(directives)?)
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init(cfg: &LoggingSection) -> anyhow::Result<()> {
    let filter = env_filter(cfg)?;
    let result = match cfg.format.as_str() {
        "json" => tracing_subscriber::fmt().json().with_env_filter(filter).try_init(),
        "text" => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
        other => anyhow::bail!("unknown log format {other:?}"),
    };
    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
