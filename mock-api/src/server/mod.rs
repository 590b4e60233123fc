//! HTTP and WebSocket surface of the mock

pub mod handlers;
pub mod serve;
pub mod state;
pub mod ws;
