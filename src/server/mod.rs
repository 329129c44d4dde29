//! # Servidor
//! src/server/mod.rs
//!
//! Arma las piezas del proceso en este orden:
//!
//! 1. Bloquea `SIGINT`/`SIGTERM`/`SIGUSR1` (antes de crear cualquier thread)
//! 2. Enlaza el socket de escucha
//! 3. Crea el pool (cola de `max_threads + 1`) y lanza el primer lote
//! 4. Lanza el thread consumidor de señales
//! 5. Entra al loop de aceptación, del que no se sale
//!
//! ```text
//!   clientes ──► Acceptor ──► BoundedQueue ──► worker-1 … worker-N ──► StaticSite
//!                   │              ▲
//!                   └─ Autoscaler ─┘ (token de terminación)
//! ```

pub mod acceptor;
pub mod diagnostics;
pub mod signals;

use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Result, ServerError};
use crate::files::StaticSite;
use crate::pool::{Autoscaler, ConnectionHandler, PoolLimits, WorkerPool};

pub use acceptor::{Acceptor, Admission, Iteration};
pub use diagnostics::Snapshot;

/// Servidor de archivos con pool de workers autoescalable
pub struct Server {
    config: Config,
    site: Arc<StaticSite>,
}

impl Server {
    /// Valida la configuración y el directorio base
    pub fn new(config: Config) -> Result<Self> {
        config.validate().map_err(ServerError::Config)?;

        let basedir = PathBuf::from(&config.basedir);
        if !basedir.is_dir() {
            return Err(ServerError::BaseDir { path: basedir });
        }

        let site = Arc::new(StaticSite::from_config(&config));
        Ok(Self { config, site })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Enlaza el socket de escucha
    pub fn bind(&self) -> Result<TcpListener> {
        let address = self.config.address();
        TcpListener::bind(&address).map_err(|source| ServerError::Bind { address, source })
    }

    /// Crea el pool y lanza el primer lote de workers
    pub fn start_pool(&self) -> Result<Arc<WorkerPool<TcpStream>>> {
        let limits = PoolLimits::from_config(&self.config);
        let handler: Arc<dyn ConnectionHandler<TcpStream>> = self.site.clone();
        let pool = WorkerPool::new(limits, handler)?;

        let launched = pool.grow(limits.initial_threads);
        if launched == 0 {
            tracing::warn!("no worker could be launched at startup");
        }

        Ok(Arc::new(pool))
    }

    /// Loop de aceptación sobre un listener ya enlazado
    pub fn acceptor(&self, listener: TcpListener, pool: Arc<WorkerPool<TcpStream>>) -> Result<Acceptor> {
        let address = self.config.address();
        let autoscaler = Autoscaler::new(Duration::from_secs(self.config.autoscale_interval_secs));
        Acceptor::new(listener, pool, autoscaler).map_err(|source| ServerError::Bind { address, source })
    }

    /// Arranca el servidor. Solo retorna si algo fatal falla.
    pub fn run(self) -> Result<()> {
        let signals = signals::block_signals()?;
        let listener = self.bind()?;
        let pool = self.start_pool()?;
        signals::spawn_consumer(signals, Arc::clone(pool.queue()), Arc::clone(pool.state()))?;

        tracing::info!(
            address = %self.config.address(),
            basedir = %self.config.basedir,
            workers = pool.snapshot().started,
            "server started"
        );

        let mut acceptor = self.acceptor(listener, pool)?;
        acceptor.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir) -> Config {
        Config {
            port: 0,
            basedir: dir.path().to_string_lossy().into_owned(),
            max_threads: 4,
            initial_threads: 2,
            low_threads: 1,
            max_free_threads: 3,
            ..Config::default()
        }
    }

    #[test]
    fn test_new_rejects_missing_basedir() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(&dir);
        config.basedir = dir.path().join("missing").to_string_lossy().into_owned();

        let err = Server::new(config).err().unwrap();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_new_rejects_file_as_basedir() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        let mut config = config_for(&dir);
        config.basedir = file.to_string_lossy().into_owned();

        assert!(matches!(Server::new(config), Err(ServerError::BaseDir { .. })));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(&dir);
        config.initial_threads = 10;

        let err = Server::new(config).err().unwrap();
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn test_new_rejects_zero_read_timeout() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(&dir);
        config.read_timeout_ms = 0;

        let err = Server::new(config).err().unwrap();
        assert!(matches!(err, ServerError::Config(ref msg) if msg.contains("read-timeout-ms")));
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn test_start_pool_launches_first_batch() {
        let dir = TempDir::new().unwrap();
        let server = Server::new(config_for(&dir)).unwrap();

        let pool = server.start_pool().unwrap();
        let snapshot = pool.snapshot();
        assert_eq!(snapshot.started, 2);
        assert_eq!(snapshot.max_threads, 4);
        assert_eq!(pool.queue().capacity(), 5);
    }

    #[test]
    fn test_bind_conflict() {
        let dir = TempDir::new().unwrap();
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = config_for(&dir);
        config.port = taken.local_addr().unwrap().port();

        let server = Server::new(config).unwrap();
        let err = server.bind().unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
