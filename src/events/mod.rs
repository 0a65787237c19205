//! # Events Module
//!
//! Event-driven progress reporting for the benchmark.
//!
//! The core library never prints; it emits [`Event`] values through an
//! [`EventSender`], and presentation layers (the CLI, tests) decide what to
//! do with them. Every long-running operation comes in two flavors:
//! `foo()` and `foo_with_events(&EventSender)`.

mod channel;
mod types;

pub use channel::{bounded, channel, null_sender, EventReceiver, EventSender};
pub use types::{
    BenchmarkEvent, DatasetEvent, Event, ExecEvent, ExecProgress,
};
