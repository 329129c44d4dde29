//! # Construcción de Respuestas HTTP
//!
//! API para construir respuestas HTTP/1.0 y convertirlas a bytes.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <html>...</html>
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use weblist::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body_bytes(b"hola".to_vec());
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.0 200 OK\r\n"));
//! ```

use super::encoding::escape_html;
use super::StatusCode;

/// Respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// Headers en orden de inserción; un nombre aparece una sola vez
    headers: Vec<(String, String)>,

    body: Vec<u8>,

    /// Para HEAD: se envían los headers pero no el body
    omit_body: bool,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
            omit_body: false,
        }
    }

    /// Agrega un header; si ya existe (sin distinguir mayúsculas) se sobrescribe
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Versión mutable de `with_header`
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el body y su `Content-Length`
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        let length = self.body.len().to_string();
        self.add_header("Content-Length", &length);
        self
    }

    /// Respuesta 200 con una página HTML
    pub fn html(body: String) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body_bytes(body.into_bytes())
    }

    /// Página de error HTML con el mensaje escapado
    ///
    /// # Ejemplo
    /// ```
    /// use weblist::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NotFound, "no <such> file");
    /// let body = String::from_utf8_lossy(response.body()).to_string();
    /// assert!(body.contains("404 Not Found"));
    /// assert!(body.contains("no&nbsp;&lt;such&gt;&nbsp;file"));
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = format!(
            "<html><head><title>{status}</title></head><body><h1>{status}</h1><p>{}</p></body></html>",
            escape_html(message)
        );
        Self::new(status)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body_bytes(body.into_bytes())
    }

    /// 301 hacia `location`
    pub fn redirect(location: &str) -> Self {
        Self::error(StatusCode::MovedPermanently, location).with_header("Location", location)
    }

    /// Marca la respuesta como de un HEAD: `Content-Length` se conserva
    pub fn without_body(mut self) -> Self {
        self.omit_body = true;
        self
    }

    /// Convierte la respuesta a bytes listos para el socket
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        result.extend_from_slice(format!("HTTP/1.0 {}\r\n", self.status).as_bytes());
        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        result.extend_from_slice(b"\r\n");

        if !self.omit_body {
            result.extend_from_slice(&self.body);
        }

        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Busca un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
