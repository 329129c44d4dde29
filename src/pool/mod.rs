//! # Pool de Workers
//! src/pool/mod.rs
//!
//! Subsistema de admisión de conexiones:
//!
//! ```text
//! Acceptor ──put──► BoundedQueue ──get──► worker_loop ──► ConnectionHandler
//!     │                                        │
//!     ├── grow_if_starved() ──► WorkerPool ◄───┘ PoolState (idle/started)
//!     └── Autoscaler::tick() ──► retire_one()
//! ```

pub mod autoscale;
pub mod manager;
pub mod queue;
pub mod state;
pub mod worker;

pub use autoscale::{Autoscaler, Tick};
pub use manager::{PoolLimits, WorkerPool};
pub use queue::{BoundedQueue, LockProbe, PutError, QueueError, QueueStatus};
pub use state::{PoolSnapshot, PoolState};
pub use worker::{ConnectionHandler, WorkItem, WorkerId};
