//! Diagnostic logging setup.
//!
//! User-facing output goes to stdout with `println!`. Diagnostics go through
//! `tracing` to stderr so they never end up in `$(git gtr go ...)`.

use tracing_subscriber::EnvFilter;

/// Filter directive for a given `-v` count.
#[must_use]
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "gtr=warn",
        1 => "gtr=info",
        2 => "gtr=debug",
        _ => "gtr=trace",
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    // A second init (e.g. from a test harness) is harmless; keep the first.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_directive(0), "gtr=warn");
        assert_eq!(default_directive(2), "gtr=debug");
        assert_eq!(default_directive(9), "gtr=trace");
    }
}
