//! # Archivos Estáticos
//!
//! Handler de conexiones que el binario conecta al pool de workers:
//!
//! - `site`: resuelve paths bajo el directorio base y arma la respuesta
//! - `listing`: página HTML de un directorio sin índice
//! - `mime`: tipo MIME según la extensión

pub mod listing;
pub mod mime;
pub mod site;

pub use site::StaticSite;
