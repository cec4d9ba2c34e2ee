//! Subscriber setup for applications embedding the stores
//!
//! The library itself only emits `tracing` events. Call [`init`] once at
//! startup to print them; `RUST_LOG` overrides the default `info` filter.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info";

/// Install a global `fmt` subscriber filtered by `RUST_LOG`
///
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
		.with(fmt::layer())
		.try_init()
}
