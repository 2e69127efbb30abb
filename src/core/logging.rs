//! Logging setup - `tracing` events rendered to stderr

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::error::ShopError;

fn build_filter(directives: &str) -> Result<EnvFilter, ShopError> {
    EnvFilter::try_new(directives)
        .map_err(|e| ShopError::Config(format!("invalid log filter: {}", e)))
}

/// Install the global subscriber
///
/// `default_filter` is used as given; `HUNTER_LOG` is already folded into the
/// config `log_level`, and `-v` flags replace it. Output goes to stderr so
/// command output on stdout stays pipeable.
pub fn init_logging(default_filter: &str) -> Result<(), ShopError> {
    let filter = build_filter(default_filter)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(console::colors_enabled_stderr());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ShopError::Config(format!("logging already initialized: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_filter_uses_given_directives() {
        let filter = build_filter("info").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));

        let filter = build_filter("warn,hunter=debug").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_bad_directive_is_config_error() {
        let err = build_filter("hunter=loudest").unwrap_err();
        assert!(matches!(err, ShopError::Config(_)));
    }
}
