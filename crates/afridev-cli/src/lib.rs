//! Command-line front end for the Afridev2 codec.
//!
//! `afridev decode` turns a message from the device into a field listing or
//! JSON; `afridev encode` builds the OTA commands sent back to it.

pub mod app;
pub mod config;
pub mod error;

pub use app::{run, run_with_config, Cli, Commands, EncodeCommand};
pub use config::Config;
pub use error::{CliError, CliResult};

use tracing_subscriber::EnvFilter;

/// Default log filter for a `-v` count.
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the verbosity flag.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    // A subscriber set up earlier (tests, embedding) stays in place.
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(0), "warn");
        assert_eq!(default_filter(1), "debug");
        assert_eq!(default_filter(5), "trace");
    }
}
