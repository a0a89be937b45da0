//! Core domain + application logic for the issue linker.
//!
//! This crate is intentionally host-agnostic. The chat platform and the issue
//! tracker live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod hooks;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod rewrite;
pub mod settings;
pub mod verify;

pub use errors::{Error, Result};
