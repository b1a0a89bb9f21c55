//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module.

pub mod brew;
pub mod expand;
pub mod init;
