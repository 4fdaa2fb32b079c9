//! CLI command implementations.

pub mod catalog;
pub mod compute;
pub mod validate;
