use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info,airq=debug";

/// RUST_LOG if set, otherwise [`DEFAULT_FILTER`]
pub fn filter_directives(rust_log: Option<String>) -> String {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Initialize logging.
/// - JSON lines on stderr, so stdout stays free for command output
/// - RUST_LOG respected; default to "info,airq=debug"
///
/// Returns false if a global subscriber was already installed.
pub fn init(service_name: &str) -> bool {
    let directives = filter_directives(std::env::var("RUST_LOG").ok());

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::new(directives))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(service = %service_name, "Logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_filter() {
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
        assert_eq!(filter_directives(Some("  ".to_string())), DEFAULT_FILTER);
        assert_eq!(filter_directives(Some("warn".to_string())), "warn");
    }

    #[test]
    fn second_init_is_refused() {
        init("first");
        assert!(!init("second"));
    }
}
