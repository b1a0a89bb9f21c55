//! Automatic import prelude for compiled scripts.
//!
//! Free identifiers that the symbol registry knows about get an import
//! statement prepended to the script body.

mod registry;
mod resolver;
pub mod scanner;

pub use registry::{ImportSymbolTable, RegistryError};
pub use resolver::ImportResolver;
pub use scanner::{Bindings, scan};
