//! Logging bootstrap

use crate::Config;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a `tracing` fmt subscriber
///
/// `RUST_LOG` takes precedence over [`Config::log_filter`]. Returns `false`
/// when a global subscriber was already installed, which is not an error.
pub fn init_logging(config: &Config) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt::Subscriber::builder().with_env_filter(filter).with_target(true).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_harmless() {
        let config = Config::default().with_log_filter("debug");
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
