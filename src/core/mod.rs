//! Core model – wire schema, widget classification, fetch state machine and
//! widget-stack construction.
//!
//! Nothing in this module depends on any TUI, rendering, or HTTP crate.
//! Time and transport results are passed in, which keeps every piece here
//! testable without a terminal or a network.

pub mod debounce;
pub mod fetch;
pub mod observable;
pub mod render;
pub mod schema;
pub mod status;
pub mod widget;
