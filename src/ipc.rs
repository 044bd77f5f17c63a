//! Daemon control plane: Unix-socket JSON requests, the gesture pipeline
//! thread, profile hot-reload and signal handling.

mod pipeline;
mod runtime;
mod server;

pub use server::{client_request, run_daemon};
