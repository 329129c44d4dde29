//! # Errores del Servidor
//! src/error.rs
//!
//! Errores fatales del proceso. Cada variante tiene su propio código de salida.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::pool::QueueError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{} must be a directory", .path.display())]
    BaseDir { path: PathBuf },

    #[error("unable to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to create connection queue: {0}")]
    Queue(#[from] QueueError),

    #[error("error polling server socket: {0}")]
    Poll(#[source] nix::Error),

    #[error("unable to set up signal handling: {0}")]
    Signals(String),
}

impl ServerError {
    /// Código de salida del proceso para este error
    pub fn exit_code(&self) -> i32 {
        match self {
            ServerError::BaseDir { .. } => 1,
            ServerError::Bind { .. } => 3,
            ServerError::Config(_) => 6,
            ServerError::Queue(_) => 7,
            ServerError::Poll(_) => 11,
            ServerError::Signals(_) => 12,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
