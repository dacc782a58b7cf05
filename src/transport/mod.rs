//! # Transport
//!
//! TCP accept loop and the per-connection read session.
//!
//! One task is spawned per accepted connection; tasks run independently and
//! only share the counter registry. A failing connection tears down its own
//! session and nothing else.

pub mod server;
pub mod session;
