//! What to do with blank and comment lines.
//!
//! The build pipeline keeps both so the brewed `.coffee` stays readable and
//! line numbers stay close to the source. `Strip` gives the compact form
//! used by `cielo expand --strip`.

/// Policy for the two line kinds that carry no code.
pub trait LinePolicy {
    /// Replacement for a blank line, or `None` to drop it.
    fn blank_line(&self) -> Option<String>;

    /// Replacement for a comment line, or `None` to drop it.
    fn comment_line(&self, line: &str) -> Option<String>;
}

/// Keep blank lines (emptied of whitespace) and comments verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct Retain;

impl LinePolicy for Retain {
    fn blank_line(&self) -> Option<String> {
        Some(String::new())
    }

    fn comment_line(&self, line: &str) -> Option<String> {
        Some(line.to_string())
    }
}

/// Drop blank lines and comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Strip;

impl LinePolicy for Strip {
    fn blank_line(&self) -> Option<String> {
        None
    }

    fn comment_line(&self, _line: &str) -> Option<String> {
        None
    }
}
