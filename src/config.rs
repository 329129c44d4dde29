//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración de weblist con soporte para argumentos CLI y variables de
//! entorno. Los límites del pool son de solo lectura una vez arrancado el
//! servidor.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./weblist --port 8080 --basedir /srv/www \
//!   --max-threads 300 \
//!   --initial-threads 15 \
//!   --max-free-threads 16
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! WEBLIST_PORT=8080 WEBLIST_IP=0.0.0.0 WEBLIST_BASEDIR=/srv/www ./weblist
//! ```

use clap::Parser;

use crate::logging::LogFormat;

/// Techo aceptado para `--max-threads`
pub const MAX_THREADS_LIMIT: usize = 65_536;

/// Techo aceptado para `--enqueue-timeout-ms`
pub const MAX_ENQUEUE_TIMEOUT_MS: u64 = 60_000;

/// Configuración de weblist
#[derive(Debug, Clone, Parser)]
#[command(name = "weblist")]
#[command(about = "Servidor HTTP de archivos estáticos con pool de workers autoescalable")]
#[command(version)]
pub struct Config {
    /// IP en la que escucha
    #[arg(short, long, default_value = "127.0.0.1", env = "WEBLIST_IP")]
    pub ip: String,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "WEBLIST_PORT")]
    pub port: u16,

    /// Directorio raíz que se sirve
    #[arg(short, long, default_value = "./www", env = "WEBLIST_BASEDIR")]
    pub basedir: String,

    /// Archivos índice de un directorio, separados por comas
    #[arg(
        short = 'I',
        long = "index",
        value_delimiter = ',',
        default_value = "index.html",
        env = "WEBLIST_INDEX"
    )]
    pub indexes: Vec<String>,

    // === Pool de workers ===

    /// Máximo de workers lanzados a la vez
    #[arg(long = "max-threads", default_value = "300", env = "WEBLIST_MAX_THREADS")]
    pub max_threads: usize,

    /// Workers lanzados por cada lote de crecimiento
    #[arg(long = "initial-threads", default_value = "15", env = "WEBLIST_INITIAL_THREADS")]
    pub initial_threads: usize,

    /// Se lanza un lote nuevo cuando los ociosos bajan a este número
    #[arg(long = "low-threads", default_value = "2", env = "WEBLIST_LOW_THREADS")]
    pub low_threads: usize,

    /// Se retira un worker cuando los ociosos superan este número
    #[arg(long = "max-free-threads", default_value = "16", env = "WEBLIST_MAX_FREE_THREADS")]
    pub max_free_threads: usize,

    /// Segundos mínimos entre dos evaluaciones del autoescalado
    #[arg(long = "autoscale-interval", default_value = "10", env = "WEBLIST_AUTOSCALE_INTERVAL")]
    pub autoscale_interval_secs: u64,

    // === Sobrecarga y conexiones ===

    /// Espera máxima (ms) para encolar una conexión antes de descartarla
    #[arg(long = "enqueue-timeout-ms", default_value = "100", env = "WEBLIST_ENQUEUE_TIMEOUT_MS")]
    pub enqueue_timeout_ms: u64,

    /// Timeout de lectura (ms) de cada conexión
    #[arg(long = "read-timeout-ms", default_value = "5000", env = "WEBLIST_READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    // === Logging ===

    /// Formato de los logs
    #[arg(long = "log-format", value_enum, default_value = "text", env = "LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Config {
    /// Crea la configuración parseando los argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (ip:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use weblist::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.max_threads == 0 {
            return Err("max-threads must be >= 1".to_string());
        }
        if self.max_threads > MAX_THREADS_LIMIT {
            return Err(format!("max-threads must be <= {}", MAX_THREADS_LIMIT));
        }
        if self.initial_threads == 0 {
            return Err("initial-threads must be >= 1".to_string());
        }
        if self.initial_threads > self.max_threads {
            return Err("initial-threads must be <= max-threads".to_string());
        }
        if self.low_threads >= self.max_threads {
            return Err("low-threads must be < max-threads".to_string());
        }
        if self.autoscale_interval_secs == 0 {
            return Err("autoscale-interval must be >= 1 second".to_string());
        }
        if self.enqueue_timeout_ms > MAX_ENQUEUE_TIMEOUT_MS {
            return Err(format!("enqueue-timeout-ms must be <= {}", MAX_ENQUEUE_TIMEOUT_MS));
        }
        if self.read_timeout_ms == 0 {
            return Err("read-timeout-ms must be >= 1".to_string());
        }
        if self.basedir.trim().is_empty() {
            return Err("basedir must not be empty".to_string());
        }
        if self.indexes.iter().all(|index| index.trim().is_empty()) {
            return Err("at least one index file is required".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║               weblist HTTP Server Configuration              ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Base dir:     {}", self.basedir);
        println!("   Index files:  {}", self.indexes.join(", "));
        println!();
        println!("👷 Worker Pool:");
        println!("   ┌──────────────────┬──────────┐");
        println!("   │ Max threads      │ {:^8} │", self.max_threads);
        println!("   │ Growth batch     │ {:^8} │", self.initial_threads);
        println!("   │ Grow when idle ≤ │ {:^8} │", self.low_threads);
        println!("   │ Shrink when idle>│ {:^8} │", self.max_free_threads);
        println!("   │ Queue capacity   │ {:^8} │", self.max_threads.saturating_add(1));
        println!("   └──────────────────┴──────────┘");
        println!();
        println!("🚦 Timing:");
        println!("   Autoscale:    every {} s", self.autoscale_interval_secs);
        println!("   Enqueue wait: {} ms", self.enqueue_timeout_ms);
        println!("   Read timeout: {} ms", self.read_timeout_ms);
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            port: 8080,
            basedir: "./www".to_string(),
            indexes: vec!["index.html".to_string()],
            max_threads: 300,
            initial_threads: 15,
            low_threads: 2,
            max_free_threads: 16,
            autoscale_interval_secs: 10,
            enqueue_timeout_ms: 100,
            read_timeout_ms: 5_000,
            log_format: LogFormat::Text,
        }
    }
}
