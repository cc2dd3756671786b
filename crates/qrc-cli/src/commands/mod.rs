//! CLI command implementations.

pub mod common;
pub mod demo;
pub mod features;
pub mod layout;
pub mod predict;
pub mod train;
pub mod version;
