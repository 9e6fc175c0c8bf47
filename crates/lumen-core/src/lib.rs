// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
pub mod config;

pub use config::{AppConfig, BootstrapSection, ConfigError, ShaderSection, WindowSection};

/// Installs the global `tracing` subscriber. `RUST_LOG` wins over `default_directive`.
pub fn init_tracing(default_directive: &str) {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
