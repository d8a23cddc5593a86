//! # whisper-tools
//!
//! Tool surface of the whisper server.
//!
//! - [`Operation`]: the closed set of operations, with schemas and typed
//!   parameter parsing
//! - [`ToolRegistry`]: name → operation, built at startup
//! - [`ToolRouter`]: per-invocation state machine producing a [`ToolEnvelope`]
//! - [`ToolError`]: the uniform error taxonomy every component error maps to

#![deny(unsafe_code)]

pub mod envelope;
pub mod errors;
pub mod handlers;
pub mod operation;
pub mod registry;
pub mod router;
pub mod utils;

pub use envelope::{ErrorBody, InvocationState, ToolEnvelope};
pub use errors::{ErrorKind, ToolError};
pub use handlers::Services;
pub use operation::{Operation, OperationParams};
pub use registry::ToolRegistry;
pub use router::ToolRouter;
