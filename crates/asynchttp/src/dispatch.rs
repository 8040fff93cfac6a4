//! Dispatch engine: runs a blocking action on its own thread and delivers
//! exactly one outcome to a callback.
//!
//! Per call, in order:
//! 1. take a ticket (only when a concurrency limit is set; blocks this call's
//!    thread, never the submitter)
//! 2. run the action inside a panic boundary
//! 3. hand the outcome to the callback, inside a second panic boundary
//! 4. return the ticket
//!
//! Threads are never pooled or reused. The limit bounds running actions, not
//! spawned threads.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::error::{DispatchError, Outcome, panic_message};
use crate::tickets::{Ticket, TicketPool};

/// Identifier of one dispatched call, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchId(uuid::Uuid);

impl DispatchId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DispatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name given to dispatched threads unless overridden.
pub const DEFAULT_THREAD_NAME: &str = "asynchttp-dispatch";

/// Callback parked where the submitter can still reach it if the thread
/// never starts.
type CallbackSlot<C> = Arc<Mutex<Option<C>>>;

pub struct DispatchEngine {
    concurrency: usize,
    tickets: Option<Arc<TicketPool>>,
    thread_name: String,
}

impl DispatchEngine {
    /// Create an engine. `concurrency == 0` means unlimited; otherwise the
    /// ticket pool is built here, once, for the engine's lifetime.
    pub fn new(concurrency: usize) -> Self {
        let tickets = match concurrency {
            0 => None,
            n => match TicketPool::new(n) {
                Ok(pool) => Some(Arc::new(pool)),
                Err(e) => {
                    tracing::warn!(error = %e, "Ticket pool unavailable - running unlimited");
                    None
                }
            },
        };

        Self {
            concurrency,
            tickets,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn tickets(&self) -> Option<&TicketPool> {
        self.tickets.as_deref()
    }

    /// Run `action` on a new thread and deliver its outcome to `callback`.
    ///
    /// Returns as soon as the thread is spawned. The callback runs exactly
    /// once, on the dispatched thread; if the thread cannot be spawned it runs
    /// on the caller's thread with [`DispatchError::Spawn`].
    pub fn dispatch<T, A, C>(&self, action: A, callback: C) -> DispatchId
    where
        T: Send + 'static,
        A: FnOnce() -> Outcome<T> + Send + 'static,
        C: FnOnce(Outcome<T>) + Send + 'static,
    {
        let id = DispatchId::new();
        let slot: CallbackSlot<C> = Arc::new(Mutex::new(Some(callback)));

        // `Builder::name` panics on interior NUL instead of returning an error.
        let spawned = if self.thread_name.contains('\0') {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "thread name may not contain interior NUL bytes",
            ))
        } else {
            let slot = Arc::clone(&slot);
            let tickets = self.tickets.clone();
            thread::Builder::new()
                .name(self.thread_name.clone())
                .spawn(move || run_dispatched(id, tickets.as_deref(), action, slot))
        };

        if let Err(e) = spawned {
            tracing::error!(dispatch = %id, error = %e, "Failed to spawn dispatch thread");
            if let Some(callback) = take_callback(&slot) {
                callback(Err(DispatchError::Spawn(e)));
            }
        }

        id
    }
}

impl Default for DispatchEngine {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchEngine")
            .field("concurrency", &self.concurrency)
            .field("tickets", &self.tickets)
            .field("thread_name", &self.thread_name)
            .finish()
    }
}

fn take_callback<C>(slot: &CallbackSlot<C>) -> Option<C> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

fn take_ticket(id: DispatchId, pool: &TicketPool) -> Option<Ticket> {
    tracing::trace!(dispatch = %id, remaining = pool.remaining(), "Waiting for ticket");
    let ticket = pool.acquire();
    match &ticket {
        Some(_) => {
            tracing::debug!(dispatch = %id, remaining = pool.remaining(), "Ticket acquired")
        }
        None => tracing::error!(dispatch = %id, "Ticket pool closed - running without ticket"),
    }
    ticket
}

fn run_dispatched<T, A, C>(
    id: DispatchId,
    tickets: Option<&TicketPool>,
    action: A,
    slot: CallbackSlot<C>,
) where
    A: FnOnce() -> Outcome<T>,
    C: FnOnce(Outcome<T>),
{
    // Held until the end of this function: returned after the callback on
    // every path, including unwinding.
    let ticket = tickets.and_then(|pool| take_ticket(id, pool));

    let outcome = match panic::catch_unwind(AssertUnwindSafe(action)) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let err = DispatchError::from_panic(payload);
            tracing::warn!(dispatch = %id, error = %err, "Action panicked");
            Err(err)
        }
    };
    tracing::debug!(dispatch = %id, ok = outcome.is_ok(), "Action finished");

    match take_callback(&slot) {
        Some(callback) => {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || callback(outcome))) {
                tracing::error!(
                    dispatch = %id,
                    panic = panic_message(payload.as_ref()),
                    "Callback panicked"
                );
            }
        }
        None => {
            debug_assert!(false, "callback already consumed");
            tracing::error!(dispatch = %id, "Bug: callback already consumed");
        }
    }

    if ticket.is_some() {
        drop(ticket);
        tracing::debug!(dispatch = %id, "Ticket returned");
    }
}
