//! Logging setup shared by the TaskPilot binaries.
//!
//! Output format follows `LOG_FORMAT`: `json` for log aggregation, anything
//! else for human-readable development output. Level filtering follows the
//! standard `RUST_LOG` syntax (default `info`), e.g.
//! `RUST_LOG=tp_platform=debug,tower_http=info`.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Install the global tracing subscriber. Call once, early in main.
pub fn init_logging(_service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json_output() {
        registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_target(true).with_ansi(true))
            .init();
    }
}

fn json_output() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::try_new("info,tp_platform=debug");
        assert!(filter.is_ok());
    }
}
