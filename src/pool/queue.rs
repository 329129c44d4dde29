//! # Cola Acotada de Conexiones
//! src/pool/queue.rs
//!
//! Buffer circular thread-safe que lleva work items desde el thread
//! aceptador hasta los workers.
//!
//! ## Sincronización
//!
//! Todos los campos viven detrás de un único `Mutex`. Dos `Condvar`
//! avisan "hay datos" (`data_available`) y "hay espacio" (`space_available`).
//!
//! ```text
//!            put()                          get()
//! Acceptor ────────► [ h | . | . | t ] ────────► Worker
//!                     ▲ head      ▲ tail
//! ```

use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

/// Errores al construir la cola
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Una cola de capacidad 0 nunca podría aceptar un item
    #[error("queue capacity must be >= 1")]
    ZeroCapacity,

    /// No se pudo reservar memoria para los slots
    #[error("unable to allocate queue with {capacity} slots")]
    Alloc { capacity: usize },
}

/// Fallo de `put`/`put_timeout`. Siempre devuelve el item rechazado.
pub enum PutError<T> {
    /// La cola fue cerrada
    Closed(T),

    /// La cola siguió llena durante todo el timeout
    Full(T),
}

impl<T> PutError<T> {
    /// Recupera el item que no se pudo encolar
    pub fn into_inner(self) -> T {
        match self {
            PutError::Closed(item) | PutError::Full(item) => item,
        }
    }

    /// Transforma el item rechazado conservando la causa
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PutError<U> {
        match self {
            PutError::Closed(item) => PutError::Closed(f(item)),
            PutError::Full(item) => PutError::Full(f(item)),
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, PutError::Full(_))
    }
}

impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PutError::Closed(_) => f.write_str("Closed(..)"),
            PutError::Full(_) => f.write_str("Full(..)"),
        }
    }
}

impl<T> fmt::Display for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PutError::Closed(_) => write!(f, "queue is closed"),
            PutError::Full(_) => write!(f, "queue is full"),
        }
    }
}

impl<T> std::error::Error for PutError<T> {}

/// Snapshot de los contadores de la cola
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub capacity: usize,
    pub count: usize,
    pub head: usize,
    pub tail: usize,
    pub waiting_data: usize,
    pub waiting_space: usize,
}

/// Resultado de un sondeo no bloqueante de un mutex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockProbe<S> {
    /// Otro thread tiene el lock en este momento
    Locked,

    /// El lock estaba libre; trae los valores leídos
    Unlocked(S),
}

impl<S> LockProbe<S> {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockProbe::Locked)
    }

    /// "locked" / "unlocked", tal como lo imprime el diagnóstico
    pub fn label(&self) -> &'static str {
        match self {
            LockProbe::Locked => "locked",
            LockProbe::Unlocked(_) => "unlocked",
        }
    }
}

/// Estado interno protegido por el mutex
struct Ring<T> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
    count: usize,
    waiting_data: usize,
    waiting_space: usize,
    closed: bool,
}

impl<T> Ring<T> {
    fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    fn push(&mut self, item: T) {
        let capacity = self.slots.len();
        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % capacity;
        self.count += 1;
    }

    fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let capacity = self.slots.len();
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % capacity;
        self.count -= 1;
        item
    }

    fn status(&self) -> QueueStatus {
        QueueStatus {
            capacity: self.slots.len(),
            count: self.count,
            head: self.head,
            tail: self.tail,
            waiting_data: self.waiting_data,
            waiting_space: self.waiting_space,
        }
    }
}

/// Cola FIFO de capacidad fija, bloqueante en ambos extremos
pub struct BoundedQueue<T> {
    ring: Mutex<Ring<T>>,
    data_available: Condvar,
    space_available: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Crea una cola con `capacity` slots.
    ///
    /// La memoria se reserva con `try_reserve_exact` para que un fallo de
    /// asignación llegue como `QueueError::Alloc` y no como abort.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| QueueError::Alloc { capacity })?;
        slots.resize_with(capacity, || None);

        Ok(Self {
            ring: Mutex::new(Ring {
                slots,
                head: 0,
                tail: 0,
                count: 0,
                waiting_data: 0,
                waiting_space: 0,
                closed: false,
            }),
            data_available: Condvar::new(),
            space_available: Condvar::new(),
            capacity,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encola un item, esperando espacio el tiempo que haga falta
    pub fn put(&self, item: T) -> Result<(), PutError<T>> {
        let mut ring = self.lock();

        while ring.is_full() && !ring.closed {
            ring.waiting_space += 1;
            ring = self
                .space_available
                .wait(ring)
                .unwrap_or_else(PoisonError::into_inner);
            ring.waiting_space -= 1;
        }

        if ring.closed {
            return Err(PutError::Closed(item));
        }

        ring.push(item);
        self.data_available.notify_one();
        Ok(())
    }

    /// Encola un item esperando como máximo `timeout` a que haya espacio
    pub fn put_timeout(&self, item: T, timeout: Duration) -> Result<(), PutError<T>> {
        let deadline = Instant::now() + timeout;
        let mut ring = self.lock();

        while ring.is_full() && !ring.closed {
            let now = Instant::now();
            if now >= deadline {
                return Err(PutError::Full(item));
            }

            ring.waiting_space += 1;
            let (guard, _) = self
                .space_available
                .wait_timeout(ring, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            ring = guard;
            ring.waiting_space -= 1;
        }

        if ring.closed {
            return Err(PutError::Closed(item));
        }

        ring.push(item);
        self.data_available.notify_one();
        Ok(())
    }

    /// Desencola el item más antiguo, bloqueando mientras la cola esté vacía.
    ///
    /// Retorna `None` solo cuando la cola fue cerrada y ya no quedan items.
    pub fn get(&self) -> Option<T> {
        let mut ring = self.lock();

        while ring.count == 0 && !ring.closed {
            ring.waiting_data += 1;
            ring = self
                .data_available
                .wait(ring)
                .unwrap_or_else(PoisonError::into_inner);
            ring.waiting_data -= 1;
        }

        let item = ring.pop();
        if item.is_some() {
            self.space_available.notify_one();
        }
        item
    }

    /// Cierra la cola y despierta a todos los que esperan
    pub fn close(&self) {
        let mut ring = self.lock();
        ring.closed = true;
        drop(ring);
        self.data_available.notify_all();
        self.space_available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Sondeo para diagnóstico: nunca bloquea
    pub fn try_status(&self) -> LockProbe<QueueStatus> {
        match self.ring.try_lock() {
            Ok(ring) => LockProbe::Unlocked(ring.status()),
            Err(TryLockError::Poisoned(poisoned)) => LockProbe::Unlocked(poisoned.into_inner().status()),
            Err(TryLockError::WouldBlock) => LockProbe::Locked,
        }
    }

    /// Snapshot consistente tomado con el lock adquirido
    pub fn status(&self) -> QueueStatus {
        self.lock().status()
    }

    pub fn len(&self) -> usize {
        self.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
