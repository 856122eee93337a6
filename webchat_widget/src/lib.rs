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

//! The UI-facing side of the chat widget.
//!
//! `ChatWidget` turns submit events into sends and feeds a [`Renderer`] with
//! an append-only log of entries plus a typing indicator.
//!
//! [`Renderer`]: webchat_core::Renderer

mod transcript;
mod widget;

pub use transcript::TranscriptRenderer;
pub use widget::ChatWidget;
