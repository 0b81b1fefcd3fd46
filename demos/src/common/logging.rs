//! Tracing subscriber setup for the binaries.

use std::io::IsTerminal;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Installs a formatted subscriber filtered by `RUST_LOG`.
///
/// Falls back to `default_filter` when `RUST_LOG` is unset or invalid. Calling this
/// more than once keeps the first subscriber.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    if let Err(err) = Registry::default().with(filter).with(fmt_layer).try_init() {
        tracing::debug!(%err, "tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_keeps_first_subscriber() {
        init_tracing("debug");
        init_tracing("warn");

        tracing::info!("still logging after repeated init");
    }
}
