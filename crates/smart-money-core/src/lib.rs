//! Shared types, store gateway, and configuration for the smart money engine.
//!
//! Every other crate in the workspace depends on this one for its data
//! model (`types`), its error type (`error`), its configuration loader
//! (`config`), and its database access layer (`db`).

pub mod config;
pub mod db;
pub mod error;
pub mod types;

pub use error::{Error, Result};
