//! Tracing initialisation for embedding processes.
//!
//! The crate itself only emits `tracing` events; a host that has no
//! subscriber of its own can call [`init_tracing`] once at startup.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: standard env-filter directives (e.g. `qlens=debug`)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Initialise a formatted `tracing` subscriber with env-filter support.
///
/// Returns an error when a global subscriber is already set, so hosts
/// that configure their own tracing stack are left untouched.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::from_default_env()),
        )
        .try_init()?;
    Ok(())
}
