//! # Sitio Estático
//! src/files/site.rs
//!
//! Handler de conexiones que sirve un directorio del disco por HTTP/1.0.
//!
//! ## Flujo por conexión
//!
//! ```text
//! read head ──► Request::parse ──► resolve(path) ──┬──► archivo  ──► 200 + bytes
//!                    │                             ├──► directorio ──► índice | listado
//!                    └──► 400 / 501                └──► 301 / 403 / 404 / 405
//! ```
//!
//! Cada conexión atiende un solo request y se cierra al soltar el stream.

use std::fs;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::http::request::{header_end, Method, ParseError, Request};
use crate::http::{Response, StatusCode};
use crate::pool::ConnectionHandler;

use super::listing::render_listing;
use super::mime::get_mime;

/// Tamaño máximo de la cabecera de un request
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Valor del header `Server`
pub const SERVER_SIGNATURE: &str = concat!("weblist/", env!("CARGO_PKG_VERSION"));

/// Handler que sirve los archivos de `basedir`
#[derive(Debug, Clone)]
pub struct StaticSite {
    basedir: PathBuf,
    indexes: Vec<String>,
    read_timeout: Duration,
}

/// Qué hay en el disco para un path pedido
enum Resolved {
    File(PathBuf),
    Directory(PathBuf),
    Missing,
}

impl StaticSite {
    pub fn new(basedir: impl Into<PathBuf>, indexes: Vec<String>, read_timeout: Duration) -> Self {
        Self {
            basedir: basedir.into(),
            indexes: indexes
                .into_iter()
                .map(|index| index.trim().to_string())
                .filter(|index| !index.is_empty())
                .collect(),
            read_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.basedir,
            config.indexes.clone(),
            Duration::from_millis(config.read_timeout_ms),
        )
    }

    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    /// Respuesta para los bytes crudos de un request.
    ///
    /// No toca la red: la usan tanto `handle` como los tests.
    pub fn respond(&self, raw: &[u8]) -> Response {
        self.respond_to(&Request::parse(raw))
    }

    fn respond_to(&self, parsed: &Result<Request, ParseError>) -> Response {
        let response = match parsed {
            Ok(request) => {
                let response = self.serve(&request);
                if request.method() == Method::HEAD {
                    response.without_body()
                } else {
                    response
                }
            }
            Err(ParseError::UnsupportedMethod(method)) => Response::error(
                StatusCode::NotImplemented,
                &format!("method {method} is not implemented"),
            ),
            Err(e) => Response::error(StatusCode::BadRequest, &e.to_string()),
        };

        response
            .with_header("Server", SERVER_SIGNATURE)
            .with_header("Connection", "close")
    }

    fn serve(&self, request: &Request) -> Response {
        if request.method() == Method::POST {
            return Response::error(StatusCode::MethodNotAllowed, "POST is not allowed here")
                .with_header("Allow", "GET, HEAD");
        }
        if request.escapes_root() {
            return Response::error(StatusCode::Forbidden, "path outside of the base directory");
        }

        match self.resolve(request) {
            Resolved::Missing => Response::error(StatusCode::NotFound, request.path()),
            Resolved::Directory(_) if !request.path().ends_with('/') => {
                Response::redirect(&format!("{}/", request.path()))
            }
            Resolved::Directory(dir) => self.serve_directory(&dir, request.path()),
            Resolved::File(file) => Self::serve_file(&file),
        }
    }

    fn resolve(&self, request: &Request) -> Resolved {
        let mut target = self.basedir.clone();
        target.extend(request.segments());

        match fs::metadata(&target) {
            Ok(metadata) if metadata.is_dir() => Resolved::Directory(target),
            Ok(metadata) if metadata.is_file() => Resolved::File(target),
            _ => Resolved::Missing,
        }
    }

    fn serve_directory(&self, dir: &Path, request_path: &str) -> Response {
        let index = self
            .indexes
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if let Some(index) = index {
            return Self::serve_file(&index);
        }

        let has_parent = request_path != "/";
        match render_listing(dir, request_path, has_parent) {
            Ok(html) => Response::html(html),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "unable to list directory");
                Response::error(StatusCode::InternalServerError, "unable to list directory")
            }
        }
    }

    fn serve_file(file: &Path) -> Response {
        let name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        match fs::read(file) {
            Ok(bytes) => Response::new(StatusCode::Ok)
                .with_header("Content-Type", get_mime(&name))
                .with_body_bytes(bytes),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Response::error(StatusCode::Forbidden, &name)
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "unable to read file");
                Response::error(StatusCode::InternalServerError, "unable to read file")
            }
        }
    }

    /// Lee hasta `\r\n\r\n` o hasta `MAX_HEAD_BYTES`
    fn read_head(stream: &mut TcpStream) -> io::Result<Vec<u8>> {
        let mut head = Vec::with_capacity(1024);
        let mut chunk = [0u8; 1024];

        while head.len() < MAX_HEAD_BYTES {
            let n = stream.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            head.extend_from_slice(&chunk[..n]);
            if header_end(&head).is_some() {
                break;
            }
        }

        head.truncate(MAX_HEAD_BYTES);
        Ok(head)
    }

    fn handle_stream(&self, mut stream: TcpStream) -> io::Result<()> {
        let start = Instant::now();
        stream.set_read_timeout(Some(self.read_timeout))?;

        let head = Self::read_head(&mut stream)?;
        if head.is_empty() {
            tracing::debug!("connection closed before sending a request");
            return Ok(());
        }

        let parsed = Request::parse(&head);
        let response = self.respond_to(&parsed);
        stream.write_all(&response.to_bytes())?;
        stream.flush()?;

        let (method, path) = access_fields(&parsed);
        let worker = std::thread::current();
        tracing::info!(
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            worker = worker.name().unwrap_or("-"),
            "request served"
        );

        Ok(())
    }
}

/// `method` y `path` de la línea de acceso; `-` si el request no parseó
fn access_fields(parsed: &Result<Request, ParseError>) -> (String, String) {
    match parsed {
        Ok(request) => (request.method().to_string(), request.path().to_string()),
        Err(ParseError::UnsupportedMethod(method)) => (method.clone(), "-".to_string()),
        Err(_) => ("-".to_string(), "-".to_string()),
    }
}

impl ConnectionHandler<TcpStream> for StaticSite {
    fn handle(&self, conn: TcpStream) {
        let peer = conn
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        if let Err(e) = self.handle_stream(conn) {
            tracing::debug!(peer = %peer, error = %e, "connection error");
        }
    }
}
