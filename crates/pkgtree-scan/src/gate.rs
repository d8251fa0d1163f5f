//! Admission gates bounding filesystem I/O and recursive workers.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, SemaphorePermit};

use pkgtree_core::BuildError;

/// Maximum concurrent filesystem operations (listings and file parses).
pub const IO_GATE_CAPACITY: usize = 20;

/// Concurrent recursive workers allowed per logical CPU.
pub const WORKERS_PER_CPU: usize = 4;

/// Worker capacity derived from available parallelism.
pub fn default_worker_capacity() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * WORKERS_PER_CPU
}

/// Two independent counting semaphores.
///
/// The I/O gate blocks until a slot frees up. The worker gate never
/// blocks: when it is full the caller does the work itself.
#[derive(Debug)]
pub struct Gates {
    io: Semaphore,
    workers: Arc<Semaphore>,
}

impl Gates {
    /// Gates with the default capacities.
    pub fn new() -> Self {
        Self::with_capacity(IO_GATE_CAPACITY, default_worker_capacity())
    }

    /// Gates with explicit capacities.
    pub fn with_capacity(io: usize, workers: usize) -> Self {
        Self {
            io: Semaphore::new(io),
            workers: Arc::new(Semaphore::new(workers)),
        }
    }

    /// Wait for an I/O slot. The slot is released when the permit drops.
    pub async fn acquire_io(&self) -> Result<SemaphorePermit<'_>, BuildError> {
        self.io
            .acquire()
            .await
            .map_err(|_| BuildError::GateClosed { gate: "io" })
    }

    /// Take a worker slot if one is free right now.
    ///
    /// The permit is owned so it can travel into a spawned task.
    pub fn try_acquire_worker(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.workers).try_acquire_owned().ok()
    }

    /// Free I/O slots.
    pub fn available_io(&self) -> usize {
        self.io.available_permits()
    }

    /// Free worker slots.
    pub fn available_workers(&self) -> usize {
        self.workers.available_permits()
    }
}

impl Default for Gates {
    fn default() -> Self {
        Self::new()
    }
}
