//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing` una sola vez al arrancar el proceso.
//!
//! - `RUST_LOG` filtra niveles (por defecto `info`)
//! - `--log-format json` (o `LOG_FORMAT=json`) cambia a salida JSON

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Formato de salida de los logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Texto legible para desarrollo
    #[default]
    Text,

    /// Una línea JSON por evento
    Json,
}

pub fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_thread_names(true)
                        .with_target(true)
                        .flatten_event(true),
                )
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_target(false).with_thread_names(true))
                .init();
        }
    }
}
