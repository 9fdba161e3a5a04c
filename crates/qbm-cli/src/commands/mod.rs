//! CLI command implementations.

pub mod common;
pub mod encode;
pub mod preprocess;
pub mod tfi;
