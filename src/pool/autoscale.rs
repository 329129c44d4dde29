//! # Control de Autoescalado
//! src/pool/autoscale.rs
//!
//! Encoge el pool cuando sobran workers ociosos. Actúa como mucho una vez por
//! intervalo y nunca retira más de un worker por tick, sin importar cuánto se
//! pase `idle` del umbral.

use std::time::{Duration, Instant};

use super::manager::WorkerPool;

/// Resultado de un tick del controlador
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Todavía no pasó el intervalo mínimo desde la última evaluación
    Throttled,

    /// Se evaluó y no hacía falta encoger
    Steady,

    /// Se encoló un token de terminación
    Shrunk,
}

/// Controlador con límite de frecuencia
#[derive(Debug)]
pub struct Autoscaler {
    interval: Duration,
    last_action: Option<Instant>,
}

impl Autoscaler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_action: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn tick<C: Send + 'static>(&mut self, pool: &WorkerPool<C>) -> Tick {
        self.tick_at(pool, Instant::now())
    }

    /// Igual que `tick` pero con el reloj explícito
    pub fn tick_at<C: Send + 'static>(&mut self, pool: &WorkerPool<C>, now: Instant) -> Tick {
        if let Some(last) = self.last_action {
            if now.saturating_duration_since(last) < self.interval {
                return Tick::Throttled;
            }
        }
        self.last_action = Some(now);

        let snapshot = pool.snapshot();
        if snapshot.idle <= pool.limits().max_free_threads {
            return Tick::Steady;
        }

        match pool.retire_one() {
            Ok(()) => {
                tracing::info!(
                    idle = snapshot.idle,
                    started = snapshot.started,
                    max_free = pool.limits().max_free_threads,
                    "too many idle workers, retiring one"
                );
                Tick::Shrunk
            }
            Err(e) => {
                tracing::warn!(error = %e, "unable to enqueue termination token");
                Tick::Steady
            }
        }
    }
}
