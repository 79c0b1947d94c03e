//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! SIGINT received (main)
//!     → Shutdown::trigger
//!     → broadcast to server and background tasks
//!     → stop accepting, drain in-flight requests, exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
