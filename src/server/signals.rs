//! # Señales
//! src/server/signals.rs
//!
//! `SIGINT`, `SIGTERM` y `SIGUSR1` se bloquean en el thread principal antes
//! de lanzar cualquier otro thread, así todos heredan la máscara. Un único
//! thread las recibe con `sigwait` y actúa fuera de contexto de señal:
//!
//! - `SIGUSR1` → volcado de diagnóstico en stdout y en el log
//! - `SIGINT` / `SIGTERM` → log final, flush y `exit(0)`

use std::io::{self, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use nix::sys::signal::{SigSet, Signal};

use crate::error::{Result, ServerError};
use crate::pool::{BoundedQueue, PoolState};

use super::diagnostics::Snapshot;

/// Qué hacer con una señal recibida
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Report,
    Stop,
}

impl SignalAction {
    pub fn for_signal(signal: Signal) -> Option<Self> {
        match signal {
            Signal::SIGUSR1 => Some(SignalAction::Report),
            Signal::SIGINT | Signal::SIGTERM => Some(SignalAction::Stop),
            _ => None,
        }
    }
}

/// Conjunto de señales que atiende el servidor
pub fn handled_signals() -> SigSet {
    let mut set = SigSet::empty();
    set.add(Signal::SIGINT);
    set.add(Signal::SIGTERM);
    set.add(Signal::SIGUSR1);
    set
}

/// Bloquea las señales en el thread actual. Debe llamarse antes de crear
/// cualquier otro thread.
pub fn block_signals() -> Result<SigSet> {
    let set = handled_signals();
    set.thread_block()
        .map_err(|e| ServerError::Signals(format!("unable to block signals: {e}")))?;
    Ok(set)
}

/// Lanza el thread que consume las señales bloqueadas
pub fn spawn_consumer<T: Send + 'static>(
    set: SigSet,
    queue: Arc<BoundedQueue<T>>,
    state: Arc<PoolState>,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || consume(set, &queue, &state))
        .map_err(|e| ServerError::Signals(format!("unable to spawn signal thread: {e}")))
}

fn consume<T>(set: SigSet, queue: &BoundedQueue<T>, state: &PoolState) {
    loop {
        let signal = match set.wait() {
            Ok(signal) => signal,
            Err(e) => {
                tracing::warn!(error = %e, "sigwait failed");
                continue;
            }
        };

        match SignalAction::for_signal(signal) {
            Some(SignalAction::Report) => report(queue, state),
            Some(SignalAction::Stop) => stop(signal),
            None => tracing::debug!(signal = %signal, "ignoring signal"),
        }
    }
}

fn report<T>(queue: &BoundedQueue<T>, state: &PoolState) {
    let snapshot = Snapshot::capture(queue, state);

    let stdout = io::stdout();
    if let Err(e) = snapshot.write_report(&mut stdout.lock()) {
        tracing::warn!(error = %e, "unable to write diagnostics");
    }
    tracing::info!(snapshot = %snapshot.to_json(), "diagnostics");
}

fn stop(signal: Signal) -> ! {
    tracing::info!(signal = %signal, "stopping server");
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
    std::process::exit(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_actions() {
        assert_eq!(SignalAction::for_signal(Signal::SIGUSR1), Some(SignalAction::Report));
        assert_eq!(SignalAction::for_signal(Signal::SIGINT), Some(SignalAction::Stop));
        assert_eq!(SignalAction::for_signal(Signal::SIGTERM), Some(SignalAction::Stop));
        assert_eq!(SignalAction::for_signal(Signal::SIGHUP), None);
    }

    #[test]
    fn test_handled_signals() {
        let set = handled_signals();
        assert!(set.contains(Signal::SIGINT));
        assert!(set.contains(Signal::SIGTERM));
        assert!(set.contains(Signal::SIGUSR1));
        assert!(!set.contains(Signal::SIGPIPE));
    }
}
