//! devbox command-line front end.
//!
//! The `devbox` binary parses global options and hands the verb to
//! [`Dispatcher`]; `devbox-brew` and `devbox-link` are thin wrappers around
//! [`commands::brew`] and [`commands::link`].

pub mod commands;
pub mod dispatch;
pub mod output;

pub use dispatch::Dispatcher;

/// Install the stderr log subscriber. `RUST_LOG` wins; otherwise the level
/// follows the `-v` count: warn, info, debug.
pub fn init_tracing(verbosity: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
