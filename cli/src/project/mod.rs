//! Project file collection

pub mod files;
