//! CLI Command handlers
//!
//! Command implementations called from main.rs once the registry is loaded.

pub mod compiler;
pub mod resolve;
