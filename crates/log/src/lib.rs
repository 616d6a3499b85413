//! Global `tracing` subscriber setup shared by binaries of the workspace.

mod setup;

pub use setup::{init, LogGuard};
