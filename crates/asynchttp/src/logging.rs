//! Tracing subscriber setup for binaries embedding asynchttp.
//!
//! The library only emits events; installing a subscriber is left to the
//! application. `ASYNCHTTP_LOG` picks the level (`debug`, `info`, `warn`,
//! `error`; default `info`), `RUST_LOG` overrides it entirely, and
//! `LOG_FORMAT=json` switches to JSON lines. Output goes to stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn level_from(value: Option<&str>) -> &'static str {
    match value {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("warn") | Some("warning") => "warn",
        Some("error") => "error",
        _ => "info",
    }
}

fn build_filter() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = level_from(std::env::var("ASYNCHTTP_LOG").ok().as_deref());
    EnvFilter::new(format!(
        "asynchttp={level},asynchttp_fetch={level}",
        level = level
    ))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_tracing() {
    let filter = build_filter();
    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}
