//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 intake/review surface for PrintLab.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod session;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
