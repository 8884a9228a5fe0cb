#![deny(missing_docs)]
//! # tkvs
//! A multi-threaded, in-memory, multi-datatype key-value store.
//!
//! A single server process owns four keyed collections — mutable strings,
//! unordered sets, FIFO queues and string-to-string hashes — sharing one
//! global key namespace. Clients talk to it over a plain TCP text protocol
//! (statements separated by `;`, request terminated by `|`), and the
//! persistent collections survive restarts through a periodic binary
//! snapshot.

pub mod command;
pub mod config;
pub mod error;
pub mod executor;
pub mod protocol;
pub mod snapshot;
pub mod store;
pub mod thread_pool;
pub mod tokenizer;

mod client;
mod server;

pub use crate::client::TkvsClient;
pub use crate::command::Op;
pub use crate::config::Config;
pub use crate::error::{ErrorCode, Result, TkvsError};
pub use crate::executor::Reply;
pub use crate::server::{spawn_dump_schedule, TkvsServer};
pub use crate::store::{HashStore, KeySpace, QueueStore, SetStore, Stores, StringStore};
