//! asynchttp: callback-based HTTP requests on dedicated threads, with an
//! optional cap on how many run at once.
//!
//! ```no_run
//! use asynchttp::{AsyncHttpClient, ClientConfig};
//!
//! let client = AsyncHttpClient::new(ClientConfig::default().with_concurrency(4));
//! client.get("http://127.0.0.1:8080/health", |outcome| match outcome {
//!     Ok(response) => println!("status {}", response.status()),
//!     Err(e) => eprintln!("request failed: {e}"),
//! });
//! ```

mod client;
mod config;
mod error;
mod version;

pub mod dispatch;
pub mod logging;
pub mod tickets;
pub mod transport;

pub use client::AsyncHttpClient;
pub use config::ClientConfig;
pub use dispatch::{DispatchEngine, DispatchId};
pub use error::{DispatchError, Outcome};
pub use tickets::{Ticket, TicketError, TicketPool};
pub use transport::{HttpTransport, Request, Response, Transport, read_body};
pub use version::{ASYNCHTTP_VERSION, default_user_agent};
