//! Credential storage

pub mod token;
