//! Application orchestration — state management, event loop plumbing,
//! network jobs, and input handling.

pub mod event;
pub mod handler;
pub mod net_runtime;
pub mod state;
