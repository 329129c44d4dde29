//! # Loop de Aceptación
//! src/server/acceptor.rs
//!
//! Cada iteración:
//!
//! 1. Espera a que el socket esté listo (`poll`, timeout = intervalo de autoescalado)
//! 2. Tick del autoescalado (se ejecuta aunque no haya llegado nadie)
//! 3. `accept` si hay una conexión pendiente
//! 4. Entrega la conexión al pool; si la cola sigue llena se descarta
//! 5. Crece el pool si quedan pocos workers ociosos
//!
//! El listener es no bloqueante para que un `accept` espurio no congele el
//! loop; los streams aceptados vuelven a modo bloqueante.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::os::fd::AsFd;
use std::sync::Arc;
use std::time::Duration;

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use crate::error::{Result, ServerError};
use crate::pool::{Autoscaler, Tick, WorkerPool};

/// Qué pasó con la conexión en una iteración
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// No había conexión pendiente (timeout, EINTR o falso positivo)
    NotReady,

    /// La conexión quedó en la cola
    Queued,

    /// Cola llena o cerrada: la conexión se cerró sin atenderla
    Shed,

    /// `accept` falló
    AcceptFailed,
}

/// Resultado de una iteración del loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iteration {
    pub tick: Tick,
    pub admission: Admission,
    pub grown: usize,
}

pub struct Acceptor {
    listener: TcpListener,
    pool: Arc<WorkerPool<TcpStream>>,
    autoscaler: Autoscaler,
    poll_timeout: Duration,
}

impl Acceptor {
    /// Toma un listener ya enlazado y lo pasa a modo no bloqueante
    pub fn new(
        listener: TcpListener,
        pool: Arc<WorkerPool<TcpStream>>,
        autoscaler: Autoscaler,
    ) -> io::Result<Self> {
        listener.set_nonblocking(true)?;
        let poll_timeout = autoscaler.interval();

        Ok(Self {
            listener,
            pool,
            autoscaler,
            poll_timeout,
        })
    }

    /// Cambia el timeout de `poll` (por defecto, el intervalo de autoescalado)
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn pool(&self) -> &Arc<WorkerPool<TcpStream>> {
        &self.pool
    }

    /// Loop infinito; solo retorna si `poll` falla
    pub fn run(&mut self) -> Result<()> {
        tracing::info!(address = ?self.listener.local_addr().ok(), "accepting connections");
        loop {
            self.run_once()?;
        }
    }

    /// Una iteración del loop
    pub fn run_once(&mut self) -> Result<Iteration> {
        let ready = self.wait_ready()?;
        let tick = self.autoscaler.tick(&*self.pool);

        let admission = if ready { self.admit() } else { Admission::NotReady };

        let grown = self.pool.grow_if_starved();

        Ok(Iteration {
            tick,
            admission,
            grown,
        })
    }

    fn wait_ready(&self) -> Result<bool> {
        let millis = self.poll_timeout.as_millis().min(u128::from(u16::MAX)) as u16;
        let mut fds = [PollFd::new(self.listener.as_fd(), PollFlags::POLLIN)];

        match poll(&mut fds, PollTimeout::from(millis)) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(fds[0]
                .revents()
                .is_some_and(|revents| revents.contains(PollFlags::POLLIN))),
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(ServerError::Poll(e)),
        }
    }

    fn admit(&self) -> Admission {
        let stream = match self.listener.accept() {
            Ok((stream, _)) => stream,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Admission::NotReady,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                return Admission::AcceptFailed;
            }
        };

        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!(error = %e, "unable to configure accepted socket");
            return Admission::AcceptFailed;
        }

        match self.pool.submit(stream) {
            Ok(()) => Admission::Queued,
            Err(e) => {
                let peer = e
                    .into_inner()
                    .peer_addr()
                    .map(|addr| addr.to_string())
                    .unwrap_or_else(|_| "unknown".to_string());
                tracing::warn!(peer = %peer, "not enough resources, dropping connection");
                Admission::Shed
            }
        }
    }
}
