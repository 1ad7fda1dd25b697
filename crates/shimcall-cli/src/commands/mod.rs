//! Subcommand implementations

pub mod bench;
pub mod members;
pub mod plan;
