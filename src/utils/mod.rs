//! # Utilities Module
//!
//! Persistent error logging shared by the session and the binary.

pub mod error_log;

pub use error_log::*;
