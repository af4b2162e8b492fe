//! CLI command implementations.

pub mod common;
pub mod eval;
pub mod fmt;
pub mod generate;
pub mod verify;
pub mod version;
