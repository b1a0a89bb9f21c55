//! Transformation stages between a source and its derived artifact.
//!
//! Macro expansion and import resolution live in their own modules; this
//! module holds the downstream compilers and the data-literal wrapper.

mod command;
mod data;
mod error;

pub use command::{
    CommandCompiler, FILE_PLACEHOLDER, NAME_PLACEHOLDER, ScriptCompiler, TemplateCompiler,
};
pub use data::{export_name, wrap_data_literal};
pub use error::StageError;
