//! Backend.im API models
//!
//! Request, response and stream frame types shared by the CLI and the mock
//! service. Field names follow the JSON wire format (camelCase).

pub mod models;

pub use models::*;
