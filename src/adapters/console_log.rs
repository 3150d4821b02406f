//! Host `log` backend.
//!
//! On the device `esp_idf_logger` routes the `log` facade to the ESP-IDF
//! console.  Host builds (simulation) install a `tracing_subscriber` fmt
//! subscriber instead; its `log` bridge picks up every `log` record.  The
//! filter comes from `IPTPAD_LOG` in `EnvFilter` syntax (`debug`,
//! `iptpad::fsm=trace,info`, ...), default `info`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

pub const LEVEL_ENV: &str = "IPTPAD_LOG";
pub const DEFAULT_LEVEL: &str = "info";

/// Build the filter from a directive string, falling back to
/// [`DEFAULT_LEVEL`] when it is missing or malformed.
pub fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LEVEL))
}

/// Install the console subscriber.  Fails if a global logger or
/// subscriber is already set.
pub fn init() -> anyhow::Result<()> {
    let filter = filter_from(std::env::var(LEVEL_ENV).ok().as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish()
        .try_init()?;
    Ok(())
}
