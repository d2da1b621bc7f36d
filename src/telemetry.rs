use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};

/// `RUST_LOG` wins over the built-in `info` default.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(false);

    match config.log_format {
        LogFormat::Json => builder
            .json()
            .try_init()
            .map_err(|err| anyhow::anyhow!(err.to_string()))?,
        LogFormat::Text => builder
            .try_init()
            .map_err(|err| anyhow::anyhow!(err.to_string()))?,
    }

    Ok(())
}
