//! Mock Backend.im API
//!
//! A stand-in for the deployment service: accepts uploads, reports polled
//! status on a time-based schedule and streams every stage over a WebSocket.

pub mod driver;
pub mod errors;
pub mod logs;
pub mod options;
pub mod server;
