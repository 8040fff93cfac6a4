//! Ticket pool implementation.
//!
//! Tickets live in a bounded channel sized to the pool capacity and pre-filled
//! at construction. Taking a ticket receives from the channel, returning one
//! sends it back, so the channel length is the number of unissued tickets.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    #[error("ticket pool can not be initialized (capacity={capacity})")]
    InvalidCapacity { capacity: usize },
}

/// Half of the pool shared with outstanding tickets so they can return home.
struct PoolReturn {
    tx: SyncSender<()>,
    available: AtomicUsize,
}

/// Fixed-capacity counting semaphore for blocking threads.
pub struct TicketPool {
    rx: Mutex<Receiver<()>>,
    home: Arc<PoolReturn>,
    capacity: usize,
}

impl TicketPool {
    pub fn new(capacity: usize) -> Result<Self, TicketError> {
        if capacity == 0 {
            return Err(TicketError::InvalidCapacity { capacity });
        }

        let (tx, rx) = mpsc::sync_channel(capacity);
        for _ in 0..capacity {
            // Cannot fail: the channel holds exactly `capacity` slots and we own `rx`.
            let _ = tx.try_send(());
        }

        tracing::debug!(capacity, "Ticket pool initialized");

        Ok(Self {
            rx: Mutex::new(rx),
            home: Arc::new(PoolReturn {
                tx,
                available: AtomicUsize::new(capacity),
            }),
            capacity,
        })
    }

    /// Block the calling thread until a ticket is free, then take it.
    ///
    /// There is no timeout. Returns `None` only if the pool's channel has
    /// been torn down, which cannot happen while `self` is alive.
    pub fn acquire(&self) -> Option<Ticket> {
        // A panic while holding the lock cannot leave the receiver half-updated.
        let rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        rx.recv().ok()?;
        drop(rx);
        Some(self.issue())
    }

    /// Take a ticket if one is free right now, without blocking.
    ///
    /// Returns `None` whenever another thread holds the receiver lock, even if
    /// a ticket is being returned at that moment. A blocked [`acquire`] holds
    /// the lock, so `None` here usually means the pool is drained, but callers
    /// must treat it as "not now" rather than "empty".
    ///
    /// [`acquire`]: TicketPool::acquire
    pub fn try_acquire(&self) -> Option<Ticket> {
        let rx = self.rx.try_lock().ok()?;
        rx.try_recv().ok()?;
        drop(rx);
        Some(self.issue())
    }

    fn issue(&self) -> Ticket {
        self.home.available.fetch_sub(1, Ordering::AcqRel);
        Ticket {
            home: Arc::clone(&self.home),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of unissued tickets. Advisory only: stale as soon as it is read.
    pub fn remaining(&self) -> usize {
        self.home.available.load(Ordering::Acquire)
    }
}

impl fmt::Debug for TicketPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketPool")
            .field("capacity", &self.capacity)
            .field("remaining", &self.remaining())
            .finish_non_exhaustive()
    }
}

/// One admission unit. Returned to its pool on drop.
#[must_use = "dropping a Ticket immediately returns it to the pool"]
pub struct Ticket {
    home: Arc<PoolReturn>,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        // Count first so `remaining()` never dips below zero when a waiter
        // takes the ticket before we would have incremented.
        self.home.available.fetch_add(1, Ordering::AcqRel);
        match self.home.tx.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                self.home.available.fetch_sub(1, Ordering::AcqRel);
                debug_assert!(false, "ticket returned to a full pool");
                tracing::error!("Bug: ticket returned to a full pool - ticket accounting is broken");
            }
            Err(TrySendError::Disconnected(())) => {
                self.home.available.fetch_sub(1, Ordering::AcqRel);
                tracing::debug!("Ticket pool gone - ticket discarded");
            }
        }
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket").finish_non_exhaustive()
    }
}
