//! # Loop del Worker
//! src/pool/worker.rs
//!
//! Cuerpo que ejecuta cada thread del pool:
//!
//! ```text
//! ┌──► idle ──► queue.get() ──► busy ──┬──► Connection ──► handler.handle()
//! │                                    │                         │
//! └────────────────────────────────────┼─────────────────────────┘
//!                                      └──► Terminate ──► retire() ──► exit
//! ```
//!
//! Ningún otro componente hace `join` de los workers: su terminación solo se
//! observa a través de `PoolState`.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::queue::BoundedQueue;
use super::state::PoolState;

/// Item que viaja por la cola
#[derive(Debug)]
pub enum WorkItem<C> {
    /// Una conexión aceptada; el worker que la saque es su único dueño
    Connection(C),

    /// El worker que lo consuma termina
    Terminate,
}

/// Identidad de un worker, asignada al crearlo. Solo para diagnóstico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub u64);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Colaborador externo que procesa una conexión y la cierra
pub trait ConnectionHandler<C>: Send + Sync {
    fn handle(&self, conn: C);
}

impl<C, F> ConnectionHandler<C> for F
where
    F: Fn(C) + Send + Sync,
{
    fn handle(&self, conn: C) {
        self(conn)
    }
}

/// Loop principal del worker.
///
/// Solo sale al consumir un `Terminate` (o si la cola se cierra); antes de
/// salir descuenta su propio `started`.
pub fn worker_loop<C>(
    id: WorkerId,
    queue: Arc<BoundedQueue<WorkItem<C>>>,
    state: Arc<PoolState>,
    handler: Arc<dyn ConnectionHandler<C>>,
) {
    tracing::debug!(worker = %id, "worker started");

    loop {
        state.mark_idle();
        let item = queue.get();
        state.mark_busy();

        match item {
            Some(WorkItem::Connection(conn)) => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(conn)));
                if let Err(payload) = outcome {
                    tracing::error!(worker = %id, panic = %panic_message(&*payload), "connection handler panicked");
                }
            }
            Some(WorkItem::Terminate) => {
                tracing::debug!(worker = %id, "termination token received");
                break;
            }
            None => {
                tracing::debug!(worker = %id, "queue closed");
                break;
            }
        }
    }

    state.retire();
    tracing::debug!(worker = %id, "worker exited");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
