//! Ticket pool bounding how many dispatched actions run at once.
//!
//! A ticket is taken before an action starts and handed back when the
//! [`Ticket`] guard drops, so every exit path of a dispatched call
//! (normal return, panic, panicking callback) returns exactly one ticket.

mod pool;

pub use pool::{Ticket, TicketError, TicketPool};
