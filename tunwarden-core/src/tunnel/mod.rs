//! Tunnel client supervision module
//!
//! Owns the lifecycle of the external tunnel client process: spawning,
//! liveness tracking, and graceful-then-forceful termination. Everything
//! the client does on the wire is the client's own business.

pub mod launcher;
pub mod process;
pub mod state;
pub mod supervisor;

// Public re-exports
pub use state::{StatusReport, TunnelState};
pub use supervisor::TunnelSupervisor;
