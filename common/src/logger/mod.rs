// Copyright (c) 2018-2025 The Botho Foundation

//! Logging setup.
//!
//! Engine code logs through the `tracing` macros directly. Binaries and
//! tests install a subscriber once through this module. Configuration is
//! read from the environment:
//! - `RUST_LOG` (or `PRV_LOG`): filter directives, default `info`
//! - `PRV_LOG_JSON=1`: JSON lines instead of the terminal format
//! - `PRV_LOG_STDERR=1`: write to stderr instead of stdout

use std::{
    env,
    io::{self, IsTerminal},
    sync::Once,
    time::Instant,
};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub use tracing::{debug, error, info, trace, warn};

static INIT: Once = Once::new();

/// Output options for [`init_logging_with`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LogOptions {
    /// Emit JSON lines.
    pub json: bool,
    /// Write to stderr instead of stdout.
    pub stderr: bool,
}

impl LogOptions {
    /// Read options from `PRV_LOG_JSON` and `PRV_LOG_STDERR`.
    pub fn from_env() -> Self {
        Self {
            json: env::var("PRV_LOG_JSON").unwrap_or_default() == "1",
            stderr: env::var("PRV_LOG_STDERR").unwrap_or_default() == "1",
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("PRV_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Subsequent calls are no-ops, and a
/// subscriber installed elsewhere is left in place.
pub fn init_logging_with(options: LogOptions) {
    INIT.call_once(|| {
        let filter = env_filter();
        let result = if options.json {
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE);
            if options.stderr {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.with_writer(io::stderr))
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.with_writer(io::stdout))
                    .try_init()
            }
        } else {
            let layer = fmt::layer()
                .with_target(true)
                .with_ansi(io::stderr().is_terminal());
            if options.stderr {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.with_writer(io::stderr))
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.with_writer(io::stdout))
                    .try_init()
            }
        };
        let _ = result;
    });
}

/// Install the global subscriber using options from the environment.
pub fn init_logging() {
    init_logging_with(LogOptions::from_env());
}

/// Install a subscriber that writes through the test harness so output is
/// captured per test. Safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init();
}

/// Measures a scope and emits its duration at trace level on drop.
pub struct TraceTime {
    msg: &'static str,
    start: Instant,
}

impl TraceTime {
    /// Start a timer labelled `msg`.
    pub fn new(msg: &'static str) -> Self {
        Self {
            msg,
            start: Instant::now(),
        }
    }
}

impl Drop for TraceTime {
    fn drop(&mut self) {
        let time_in_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        let time = match time_in_ms as u64 {
            0..=3000 => format!("{time_in_ms:.2}ms"),
            3001..=60000 => format!("{:.2}s", time_in_ms / 1000.0),
            _ => format!("{:.2}m", time_in_ms / 1000.0 / 60.0),
        };
        tracing::trace!(duration_ms = time_in_ms, "{}: took {}", self.msg, time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_test_logging();
        init_test_logging();
        init_logging_with(LogOptions::default());
        init_logging_with(LogOptions {
            json: true,
            stderr: true,
        });
        info!("logging initialised");
    }

    #[test]
    fn test_trace_time_scope() {
        init_test_logging();
        {
            let _timer = TraceTime::new("inner");
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }
}
