//! Backend.im HTTP API

pub mod client;
pub mod deployments;
