//! Macro preprocessor for `.cielo` scripts.
//!
//! Converts macro-script text into CoffeeScript in one forward pass over
//! logical lines. Per logical line, in priority order:
//!
//! 1. `__END__` stops processing; the rest of the file is discarded
//! 2. `... <<<TAG` on a code line opens a literal block up to a `TAG` line;
//!    it is emitted as a `"""` block string whose content is escaped and
//!    never re-indented. Existing `"""` block strings pass through untouched
//! 3. `include <path>` / `#include <path>` is replaced by the expanded file
//! 4. `{{FILE}}` and `{{LINE}}` are substituted
//! 5. blank and comment lines go through the [`LinePolicy`]
//! 6. everything else passes through
//!
//! A trailing `\` joins a physical line with the next one, unless the next
//! one is `__END__`.

mod error;
mod expander;
pub mod lines;
mod policy;

pub use error::PreprocessError;
pub use expander::Preprocessor;
pub use policy::{LinePolicy, Retain, Strip};
