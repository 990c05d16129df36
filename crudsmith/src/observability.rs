//! Observability (logging, tracing)
//!
//! Provides structured logging for the scaffold engine and the CLI.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing_subscriber::util::TryInitError;

/// Initialize the logging stack
///
/// Sets up:
/// - Pretty formatting in debug builds, JSON formatting in release builds
/// - Environment-based log level filtering (`RUST_LOG`)
/// - Output on stderr, so generated listings on stdout stay clean
///
/// `default_directive` applies when `RUST_LOG` is unset.
///
/// # Example
///
/// ```rust,no_run
/// # fn main() -> Result<(), crudsmith::observability::TryInitError> {
/// crudsmith::observability::init("warn")?;
/// tracing::info!("scaffolding started");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(default_directive: &str) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    }
}

/// Default directive for a verbosity count (`-v`, `-vv`)
#[must_use]
pub const fn directive_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info,crudsmith=debug",
        _ => "debug,crudsmith=trace",
    }
}
