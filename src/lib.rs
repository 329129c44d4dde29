//! # weblist
//! src/lib.rs
//!
//! Servidor HTTP/1.0 de archivos estáticos con un pool de workers que crece
//! y se encoge según la carga.
//!
//! ## Arquitectura
//!
//! - `pool`: cola acotada, estado compartido, workers y autoescalado
//! - `server`: loop de aceptación, señales y diagnóstico
//! - `files`: handler que sirve el directorio base
//! - `http`: parsing de requests y construcción de responses
//! - `config`: argumentos CLI y variables de entorno
//! - `logging`: inicialización de `tracing`
//! - `error`: errores fatales y códigos de salida
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use weblist::config::Config;
//! use weblist::server::Server;
//!
//! let config = Config::default();
//! let server = Server::new(config).expect("invalid configuration");
//! server.run().expect("server failed");
//! ```

pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod logging;
pub mod pool;
pub mod server;

pub use error::{Result, ServerError};
