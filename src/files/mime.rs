//! # Tipos MIME
//! src/files/mime.rs
//!
//! Tabla ordenada extensión → MIME. Gana la primera coincidencia, así que
//! `.ts` se sirve como `application/javascript` aunque también aparezca
//! como `video/mp2t` más abajo.

/// MIME cuando no hay extensión o no está en la tabla
pub const MIME_DEFAULT: &str = "application/octet-stream";

const MIME_TABLE: &[(&str, &[&str])] = &[
    ("text/html", &[".html", ".htm", ".shtml", ".h5"]),
    ("text/css", &[".css", ".scss"]),
    ("text/xml", &[".xml"]),
    ("image/gif", &[".gif"]),
    ("image/jpeg", &[".jpeg", ".jpg"]),
    ("application/javascript", &[".js", ".ts"]),
    ("application/atom+xml", &[".atom"]),
    ("application/rss+xml", &[".rss"]),
    ("text/plain", &[".txt", ".log", ".pid"]),
    ("text/vnd.sun.j2me.app-descriptor", &[".jad"]),
    ("text/vnd.wap.wml", &[".wml"]),
    ("text/x-component", &[".htc"]),
    ("image/png", &[".png"]),
    ("image/svg+xml", &[".svg", ".svgz"]),
    ("image/tiff", &[".tif", ".tiff"]),
    ("image/vnd.wap.wbmp", &[".wbmp"]),
    ("image/webp", &[".webp"]),
    ("image/x-icon", &[".ico"]),
    ("image/x-ms-bmp", &[".bmp"]),
    ("font/woff", &[".woff"]),
    ("font/woff2", &[".woff2"]),
    ("application/java-archive", &[".jar", ".war", ".ear"]),
    ("application/json", &[".json"]),
    ("application/mac-binhex40", &[".hqx"]),
    ("application/msword", &[".doc"]),
    ("application/pdf", &[".pdf"]),
    ("application/postscript", &[".ps", ".eps", ".ai"]),
    ("application/rtf", &[".rtf"]),
    ("application/vnd.apple.mpegurl", &[".m3u8"]),
    ("application/vnd.google-earth.kml+xml", &[".kml"]),
    ("application/vnd.google-earth.kmz", &[".kmz"]),
    ("application/vnd.ms-excel", &[".xls"]),
    ("application/vnd.ms-fontobject", &[".eot"]),
    ("application/vnd.ms-powerpoint", &[".ppt"]),
    ("application/vnd.oasis.opendocument.graphics", &[".odg"]),
    ("application/vnd.oasis.opendocument.presentation", &[".odp"]),
    ("application/vnd.oasis.opendocument.spreadsheet", &[".ods"]),
    ("application/vnd.oasis.opendocument.text", &[".odt"]),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        &[".pptx"],
    ),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        &[".xlsx"],
    ),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        &[".docx"],
    ),
    ("application/vnd.wap.wmlc", &[".wmlc"]),
    ("application/x-7z-compressed", &[".7z"]),
    ("application/x-cocoa", &[".cco"]),
    ("application/x-java-archive-diff", &[".jardiff"]),
    ("application/x-java-jnlp-file", &[".jnlp"]),
    ("application/x-makeself", &[".run"]),
    ("application/x-perl", &[".pl", ".pm"]),
    ("application/x-rar-compressed", &[".rar"]),
    ("application/x-redhat-package-manager", &[".rpm"]),
    ("application/x-sea", &[".sea"]),
    ("application/x-shockwave-flash", &[".swf"]),
    ("application/x-x509-ca-cert", &[".der", ".pem", ".crt"]),
    ("application/x-xpinstall", &[".xpi"]),
    ("application/xhtml+xml", &[".xhtml"]),
    ("application/xspf+xml", &[".xspf"]),
    ("application/zip", &[".zip"]),
    ("audio/midi", &[".mid", ".midi", ".kar"]),
    ("audio/mpeg", &[".mp3"]),
    ("audio/ogg", &[".ogg", ".opus"]),
    ("audio/x-m4a", &[".m4a", ".aac"]),
    ("audio/x-realaudio", &[".ra"]),
    ("video/3gpp", &[".3gpp", ".3gp"]),
    ("video/mp2t", &[".ts", ".m2ts"]),
    ("video/mp4", &[".mp4"]),
    ("video/mpeg", &[".mpeg", ".mpg"]),
    ("video/quicktime", &[".mov"]),
    ("video/webm", &[".webm", ".mkv"]),
    ("video/x-flv", &[".flv"]),
    ("video/x-m4v", &[".m4v"]),
    ("video/x-msvideo", &[".avi"]),
];

/// MIME de un nombre de archivo según su última extensión
///
/// # Ejemplo
/// ```
/// use weblist::files::mime::get_mime;
/// assert_eq!(get_mime("index.HTML"), "text/html");
/// assert_eq!(get_mime("archive.tar.gz"), "application/octet-stream");
/// ```
pub fn get_mime(file_name: &str) -> &'static str {
    let Some(dot) = file_name.rfind('.') else {
        return MIME_DEFAULT;
    };
    let extension = file_name[dot..].to_ascii_lowercase();

    MIME_TABLE
        .iter()
        .find(|(_, extensions)| extensions.contains(&extension.as_str()))
        .map(|(mime, _)| *mime)
        .unwrap_or(MIME_DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_mime("style.css"), "text/css");
        assert_eq!(get_mime("photo.jpg"), "image/jpeg");
        assert_eq!(get_mime("data.json"), "application/json");
        assert_eq!(get_mime("notes.txt"), "text/plain");
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(get_mime("main.ts"), "application/javascript");
        assert_eq!(get_mime("clip.m2ts"), "video/mp2t");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(get_mime("LOGO.PNG"), "image/png");
        assert_eq!(get_mime("Report.Pdf"), "application/pdf");
    }

    #[test]
    fn test_default() {
        assert_eq!(get_mime("Makefile"), MIME_DEFAULT);
        assert_eq!(get_mime("binary.xyz"), MIME_DEFAULT);
        assert_eq!(get_mime("trailing."), MIME_DEFAULT);
    }

    #[test]
    fn test_only_last_extension_counts() {
        assert_eq!(get_mime("page.html.bak"), MIME_DEFAULT);
        assert_eq!(get_mime("backup.txt.zip"), "application/zip");
    }
}
