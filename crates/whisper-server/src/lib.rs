//! # whisper-server
//!
//! Stdio front end for the whisper tool router: JSON-RPC 2.0 framing,
//! the `initialize` / `tools/list` / `tools/call` methods, and the
//! newline-delimited read/write loop. The binary in `main.rs` only
//! bootstraps settings and logging around [`stdio::serve`].

#![deny(unsafe_code)]

pub mod rpc;
pub mod stdio;

pub use rpc::{RpcErrorBody, RpcRequest, RpcResponse, RpcServer, render_envelope};
pub use stdio::serve;
