//! # Parsing de Requests HTTP/1.0
//! src/http/request.rs
//!
//! ## Formato de un Request HTTP/1.0
//!
//! ```text
//! GET /docs/my%20file.txt?v=2 HTTP/1.0\r\n
//! Host: localhost:8080\r\n
//! User-Agent: curl/8.5.0\r\n
//! \r\n
//! ```
//!
//! El servidor sólo sirve archivos, así que el body de un request nunca
//! se lee: basta con la request line y los headers.

use std::collections::HashMap;

use thiserror::Error;

use super::encoding::percent_decode;

/// Terminador de la sección de headers
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Métodos HTTP reconocidos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,

    /// Como GET pero sin body en la respuesta
    HEAD,

    /// Reconocido pero no servible (405)
    POST,
}

impl Method {
    fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request HTTP/1.0 parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Path decodificado, sin query string (ej: "/docs/my file.txt")
    path: String,

    /// Query string sin decodificar, si la hay
    query: Option<String>,

    /// Headers con el nombre en minúsculas
    headers: HashMap<String, String>,

    version: String,
}

/// Errores de parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty request")]
    EmptyRequest,

    #[error("invalid request line")]
    InvalidRequestLine,

    /// Se responde con 501 en vez de 400
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    #[error("invalid request path: {0}")]
    InvalidPath(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

/// Posición donde terminan los headers (incluyendo `\r\n\r\n`)
///
/// # Ejemplo
/// ```
/// use weblist::http::request::header_end;
/// assert_eq!(header_end(b"GET / HTTP/1.0\r\n\r\nbody"), Some(18));
/// assert_eq!(header_end(b"GET / HTTP/1.0\r\n"), None);
/// ```
pub fn header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
        .map(|pos| pos + HEADER_TERMINATOR.len())
}

impl Request {
    /// Parsea la request line y los headers
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use weblist::http::Request;
    ///
    /// let raw = b"GET /my%20docs/?sort=name HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/my docs/");
    /// assert_eq!(request.query(), Some("sort=name"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let head = match header_end(buffer) {
            Some(end) => &buffer[..end],
            None => buffer,
        };

        let text = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;
        if text.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = text.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::EmptyRequest)?;
        let (method, path, query, version) = Self::parse_request_line(request_line)?;
        let headers = Self::parse_headers(lines)?;

        Ok(Request {
            method,
            path,
            query,
            headers,
            version,
        })
    }

    /// Formato: `GET /path?query HTTP/1.0`
    fn parse_request_line(
        line: &str,
    ) -> Result<(Method, String, Option<String>, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::parse(parts[0])?;

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        let target = parts[1];
        let (raw_path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };

        if !raw_path.starts_with('/') {
            return Err(ParseError::InvalidPath(target.to_string()));
        }
        let path =
            percent_decode(raw_path).ok_or_else(|| ParseError::InvalidPath(target.to_string()))?;
        if path.contains('\0') {
            return Err(ParseError::InvalidPath(target.to_string()));
        }

        Ok((method, path, query, version))
    }

    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.is_empty() {
                break;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        Ok(headers)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Busca un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Segmentos no vacíos del path
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|segment| !segment.is_empty())
    }

    /// `true` si algún segmento es `..`
    pub fn escapes_root(&self) -> bool {
        self.segments().any(|segment| segment == "..")
    }
}
