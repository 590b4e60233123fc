//! Backend.im CLI
//!
//! Uploads project files to Backend.im and follows the resulting deployment,
//! either by streaming updates over a WebSocket or by polling the status API.

pub mod authn;
pub mod cli;
pub mod commands;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod output;
pub mod project;
pub mod storage;
pub mod transport;
pub mod utils;
