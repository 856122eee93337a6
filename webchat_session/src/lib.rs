#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Client-side conversation sessions.
//!
//! A session correlates the turns of one browsing context for a bounded
//! window (24 hours by default). The record lives in a pluggable
//! [`webchat_core::Storage`] backend and every storage failure degrades to
//! "no session data" instead of reaching the caller.

mod backend;
mod record;
mod store;

pub use backend::{DisabledStorage, FileStorage, MemoryStorage};
pub use record::{SessionHandle, SessionKind, SessionRecord};
pub use store::SessionStore;
