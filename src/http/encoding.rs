//! # Codificación de URIs y HTML
//! src/http/encoding.rs
//!
//! - `percent_decode`: path del request (`%20` → espacio)
//! - `percent_encode`: nombres de archivo dentro de un `href`
//! - `escape_html`: nombres y mensajes dentro de una página HTML

/// Caracteres reservados que se codifican en un `href`
const RESERVED: &[u8] = b"!*'();:@&=+$,/?#[]%><\" \\";

/// Decodifica secuencias `%XX`.
///
/// Retorna `None` si hay una secuencia truncada o inválida, o si el
/// resultado no es UTF-8.
///
/// # Ejemplo
/// ```
/// use weblist::http::encoding::percent_decode;
/// assert_eq!(percent_decode("/my%20file.txt").as_deref(), Some("/my file.txt"));
/// assert_eq!(percent_decode("/bad%2"), None);
/// ```
pub fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(decoded).ok()
}

/// Codifica los caracteres reservados como `%xx`
pub fn percent_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii() && RESERVED.contains(&(c as u8)) {
            encoded.push_str(&format!("%{:02x}", c as u8));
        } else {
            encoded.push(c);
        }
    }
    encoded
}

/// Reemplaza `& < > " espacio` por sus entidades HTML
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            ' ' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode_plain() {
        assert_eq!(percent_decode("/index.html").as_deref(), Some("/index.html"));
    }

    #[test]
    fn test_percent_decode_utf8() {
        assert_eq!(percent_decode("/caf%C3%A9").as_deref(), Some("/café"));
    }

    #[test]
    fn test_percent_decode_invalid() {
        assert_eq!(percent_decode("%zz"), None);
        assert_eq!(percent_decode("abc%"), None);
        assert_eq!(percent_decode("%ff"), None);
    }

    #[test]
    fn test_percent_encode_reserved() {
        assert_eq!(percent_encode("a b&c.txt"), "a%20b%26c.txt");
        assert_eq!(percent_encode("100%"), "100%25");
        assert_eq!(percent_encode("ñandú"), "ñandú");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a & \"b\">"), "&lt;a&nbsp;&amp;&nbsp;&quot;b&quot;&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
