//! # Listado de Directorios
//! src/files/listing.rs
//!
//! Genera la página HTML de un directorio sin archivo índice:
//!
//! - Orden alfabético por nombre
//! - Se omiten las entradas ocultas (que empiezan con `.`)
//! - Directorios con `/` final y `-` como tamaño
//! - Tamaños escalados a B/KB/MB/GB
//! - Fecha de modificación `%y-%m-%d %H:%M` en hora local

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::http::encoding::{escape_html, percent_encode};

/// Tipo de una entrada del listado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File { size: u64 },
    Directory,
}

/// Entrada visible de un directorio
#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub name: String,
    pub kind: EntryKind,
    pub modified: Option<SystemTime>,
}

/// Escala un tamaño en bytes por división entera entre 1024
///
/// # Ejemplo
/// ```
/// use weblist::files::listing::scale_size;
/// assert_eq!(scale_size(512), (512, "B"));
/// assert_eq!(scale_size(3 * 1024 * 1024 + 10), (3, "MB"));
/// ```
pub fn scale_size(bytes: u64) -> (u64, &'static str) {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes;
    let mut unit = 0;
    while size >= 1024 && unit < UNITS.len() - 1 {
        size /= 1024;
        unit += 1;
    }
    (size, UNITS[unit])
}

/// Fecha de modificación en hora local
pub fn format_modified(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%y-%m-%d %H:%M").to_string()
}

/// Lee las entradas visibles de `dir`, ordenadas por nombre.
///
/// Las entradas que no son ni archivo regular ni directorio (o cuyo
/// `stat` falla) no aparecen.
pub fn read_entries(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        // fs::metadata sigue los symlinks, igual que stat
        let Ok(metadata) = fs::metadata(entry.path()) else {
            continue;
        };
        let kind = if metadata.is_file() {
            EntryKind::File { size: metadata.len() }
        } else if metadata.is_dir() {
            EntryKind::Directory
        } else {
            continue;
        };

        entries.push(ListingEntry {
            name,
            kind,
            modified: metadata.modified().ok(),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Página HTML completa del listado.
///
/// `request_path` es el path pedido (ya decodificado) y sólo se usa en el
/// título; `has_parent` agrega el enlace `../`.
pub fn render_listing(dir: &Path, request_path: &str, has_parent: bool) -> io::Result<String> {
    let entries = read_entries(dir)?;
    let title = escape_html(request_path);

    let mut html = String::with_capacity(512 + entries.len() * 128);
    html.push_str(&format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Index of {title}</title></head>\n<body>\n<h1>Index of {title}</h1>\n<table>\n<tr><th>Name</th><th>Size</th><th>Last modified</th></tr>\n"
    ));

    if has_parent {
        html.push_str("<tr><td><a href=\"../\">../</a></td><td>-</td><td>-</td></tr>\n");
    }

    for entry in &entries {
        let href = percent_encode(&entry.name);
        let name = escape_html(&entry.name);
        let modified = entry.modified.map(format_modified).unwrap_or_else(|| "-".to_string());

        match entry.kind {
            EntryKind::File { size } => {
                let (size, unit) = scale_size(size);
                html.push_str(&format!(
                    "<tr><td><a href=\"{href}\">{name}</a></td><td>{size}{unit}</td><td>{modified}</td></tr>\n"
                ));
            }
            EntryKind::Directory => {
                html.push_str(&format!(
                    "<tr><td><a href=\"{href}/\">{name}/</a></td><td>-</td><td>{modified}</td></tr>\n"
                ));
            }
        }
    }

    html.push_str("</table>\n</body></html>\n");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    fn sample_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), vec![0u8; 2048]).unwrap();
        fs::write(dir.path().join("a file.txt"), b"hello").unwrap();
        fs::write(dir.path().join(".hidden"), b"secret").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        dir
    }

    #[test]
    fn test_scale_size() {
        assert_eq!(scale_size(0), (0, "B"));
        assert_eq!(scale_size(1023), (1023, "B"));
        assert_eq!(scale_size(1024), (1, "KB"));
        assert_eq!(scale_size(1024 * 1024 - 1), (1023, "KB"));
        assert_eq!(scale_size(5 * 1024 * 1024 * 1024), (5, "GB"));
        assert_eq!(scale_size(4096 * 1024 * 1024 * 1024), (4096, "GB"));
    }

    #[test]
    fn test_format_modified_shape() {
        let formatted = format_modified(UNIX_EPOCH + Duration::from_secs(1_700_000_000));
        // yy-mm-dd HH:MM
        assert_eq!(formatted.len(), 14);
        assert_eq!(&formatted[2..3], "-");
        assert_eq!(&formatted[8..9], " ");
        assert_eq!(&formatted[11..12], ":");
    }

    #[test]
    fn test_read_entries_sorted_without_hidden() {
        let dir = sample_dir();
        let entries = read_entries(dir.path()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["a file.txt", "b.txt", "sub"]);
        assert_eq!(entries[1].kind, EntryKind::File { size: 2048 });
        assert_eq!(entries[2].kind, EntryKind::Directory);
    }

    #[test]
    fn test_render_listing() {
        let dir = sample_dir();
        let html = render_listing(dir.path(), "/docs/", true).unwrap();

        assert!(html.contains("Index of /docs/"));
        assert!(html.contains("<a href=\"../\">../</a>"));
        assert!(html.contains("<a href=\"a%20file.txt\">a&nbsp;file.txt</a>"));
        assert!(html.contains("<td>2KB</td>"));
        assert!(html.contains("<a href=\"sub/\">sub/</a></td><td>-</td>"));
        assert!(!html.contains(".hidden"));
    }

    #[test]
    fn test_render_listing_root_has_no_parent() {
        let dir = sample_dir();
        let html = render_listing(dir.path(), "/", false).unwrap();
        assert!(!html.contains("../"));
    }

    #[test]
    fn test_render_missing_dir() {
        let dir = TempDir::new().unwrap();
        let result = render_listing(&dir.path().join("nope"), "/nope/", true);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
