//! Single forward pass over logical lines of a macro script.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::PreprocessError;
use super::lines::{
    BLOCK_QUOTE, END_TOKEN, LineKind, classify_line, closes_block_string, closes_literal,
    continues, escape_block_line, indentation, join_continuation, substitute_tokens,
};
use super::policy::{LinePolicy, Retain};
use crate::source::display_name;

/// Expands `.cielo` macro scripts into CoffeeScript text.
///
/// Expansion is all-or-nothing: any directive error aborts the whole
/// top-level call and no text is returned.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor<P: LinePolicy = Retain> {
    policy: P,
    /// Directories searched after the including file's own directory.
    include_dirs: Vec<PathBuf>,
}

impl Preprocessor<Retain> {
    pub fn new() -> Self {
        Self::with_policy(Retain)
    }
}

impl<P: LinePolicy> Preprocessor<P> {
    pub fn with_policy(policy: P) -> Self {
        Self {
            policy,
            include_dirs: Vec::new(),
        }
    }

    /// Add fallback include directories.
    pub fn include_dirs(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.include_dirs.extend(dirs);
        self
    }

    /// Read and expand a file.
    pub fn expand_file(&self, path: &Path) -> Result<String, PreprocessError> {
        let text = read(path)?;
        self.expand_str(&text, path)
    }

    /// Expand `text` as if it were the contents of `origin`.
    ///
    /// `origin` supplies the `{{FILE}}` name, the base directory for
    /// includes, and the root of the include chain.
    pub fn expand_str(&self, text: &str, origin: &Path) -> Result<String, PreprocessError> {
        let mut stack = vec![canonical(origin)];
        let mut out = Vec::new();
        self.expand_into(text, origin, &mut stack, &mut out)?;
        Ok(render(&out))
    }

    fn expand_into(
        &self,
        text: &str,
        origin: &Path,
        stack: &mut Vec<PathBuf>,
        out: &mut Vec<OutLine>,
    ) -> Result<(), PreprocessError> {
        let name = display_name(origin);
        let lines = physical_lines(text);
        let mut i = 0;

        while i < lines.len() {
            let start = i + 1;
            let mut logical = substitute_tokens(lines[i], &name, start);
            let raw_first = lines[i];
            i += 1;

            if continues(raw_first) {
                // A continuation never swallows the end marker
                while continues(&logical) && i < lines.len() && lines[i].trim() != END_TOKEN {
                    let next = substitute_tokens(lines[i], &name, i + 1);
                    logical = join_continuation(&logical, &next);
                    i += 1;
                }
            }

            match classify_line(&logical) {
                LineKind::End => break,

                LineKind::LiteralOpen { head, tag } => {
                    out.push(OutLine::code(format!("{head}{BLOCK_QUOTE}")));
                    let mut closed = false;
                    while i < lines.len() {
                        let raw = lines[i];
                        i += 1;
                        if closes_literal(raw, tag) {
                            out.push(OutLine::code(format!("{}{BLOCK_QUOTE}", indentation(raw))));
                            closed = true;
                            break;
                        }
                        out.push(OutLine::verbatim(escape_block_line(raw)));
                    }
                    if !closed {
                        return Err(unterminated(origin, start, &logical));
                    }
                }

                LineKind::BlockString => {
                    out.push(OutLine::code(logical.clone()));
                    let mut closed = false;
                    while i < lines.len() {
                        let raw = lines[i];
                        i += 1;
                        if closes_block_string(raw) {
                            out.push(OutLine::code(raw.to_string()));
                            closed = true;
                            break;
                        }
                        out.push(OutLine::verbatim(raw.to_string()));
                    }
                    if !closed {
                        return Err(unterminated(origin, start, &logical));
                    }
                }

                LineKind::Include { indent, target } => {
                    let indent = indent.to_string();
                    let directive = logical.trim().to_string();
                    let included = self.resolve_include(target, origin).ok_or_else(|| {
                        PreprocessError::MissingInclude {
                            file: origin.to_path_buf(),
                            line: start,
                            directive: directive.clone(),
                        }
                    })?;

                    let key = canonical(&included);
                    if stack.contains(&key) {
                        let mut chain = stack.clone();
                        chain.push(key);
                        return Err(PreprocessError::IncludeCycle {
                            file: origin.to_path_buf(),
                            line: start,
                            directive,
                            chain,
                        });
                    }

                    let body = read(&included)?;
                    let mut nested = Vec::new();
                    stack.push(key);
                    self.expand_into(&body, &included, stack, &mut nested)?;
                    stack.pop();

                    out.extend(nested.into_iter().map(|line| line.indented(&indent)));
                }

                LineKind::Blank => {
                    if let Some(line) = self.policy.blank_line() {
                        out.push(OutLine::code(line));
                    }
                }

                LineKind::Comment => {
                    if let Some(line) = self.policy.comment_line(&logical) {
                        out.push(OutLine::code(line));
                    }
                }

                LineKind::Code => out.push(OutLine::code(logical)),
            }
        }

        Ok(())
    }

    /// Locate an include target: the including file's directory first,
    /// then each configured include directory.
    fn resolve_include(&self, target: &str, origin: &Path) -> Option<PathBuf> {
        let target = Path::new(target);
        if target.is_absolute() {
            return target.is_file().then(|| target.to_path_buf());
        }

        let base = origin.parent().unwrap_or(Path::new("."));
        std::iter::once(base)
            .chain(self.include_dirs.iter().map(PathBuf::as_path))
            .map(|dir| dir.join(target))
            .find(|candidate| candidate.is_file())
    }
}

/// One output line. Block content is never re-indented.
struct OutLine {
    text: String,
    verbatim: bool,
}

impl OutLine {
    fn code(text: String) -> Self {
        Self {
            text,
            verbatim: false,
        }
    }

    fn verbatim(text: String) -> Self {
        Self {
            text,
            verbatim: true,
        }
    }

    fn indented(self, indent: &str) -> Self {
        if self.verbatim || indent.is_empty() || self.text.trim().is_empty() {
            self
        } else {
            Self::code(format!("{indent}{}", self.text))
        }
    }
}

/// Split text into physical lines without a phantom line after a final newline.
fn physical_lines(text: &str) -> Vec<&str> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').collect()
}

fn render(lines: &[OutLine]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut text = lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    text.push('\n');
    text
}

fn unterminated(origin: &Path, line: usize, directive: &str) -> PreprocessError {
    PreprocessError::UnterminatedLiteral {
        file: origin.to_path_buf(),
        line,
        directive: directive.trim().to_string(),
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn read(path: &Path) -> Result<String, PreprocessError> {
    fs::read_to_string(path).map_err(|source| PreprocessError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::Strip;
    use tempfile::TempDir;

    fn expand(text: &str) -> String {
        Preprocessor::new()
            .expand_str(text, Path::new("/virtual/app.cielo"))
            .unwrap()
    }

    #[test]
    fn test_keeps_blank_lines_and_comments() {
        let src = "# header\n\nx = 1\n   \n# trailing\n";
        assert_eq!(expand(src), "# header\n\nx = 1\n\n# trailing\n");
    }

    #[test]
    fn test_strip_policy_drops_blank_lines_and_comments() {
        let out = Preprocessor::with_policy(Strip)
            .expand_str("# header\n\nx = 1\n# c\ny = 2\n", Path::new("/v/a.cielo"))
            .unwrap();
        assert_eq!(out, "x = 1\ny = 2\n");
    }

    #[test]
    fn test_tokens_use_original_line_numbers() {
        let src = "a = '{{FILE}}'\n\nb = {{LINE}}\n";
        assert_eq!(expand(src), "a = 'app.cielo'\n\nb = 3\n");
    }

    #[test]
    fn test_continuation_lines_are_joined() {
        let src = "total = a + \\\n    b + \\\n    {{LINE}}\nnext = 1\n";
        assert_eq!(expand(src), "total = a + b + 3\nnext = 1\n");
    }

    #[test]
    fn test_end_marker_truncates() {
        let src = "x = 1\n__END__\ny = 2\ninclude missing.part\n";
        assert_eq!(expand(src), "x = 1\n");
    }

    #[test]
    fn test_literal_block_becomes_block_string() {
        let src = "html = <<<HTML\n<p>{{LINE}}</p>\n\n  # not a comment\\\n__END__\nHTML\ny = {{LINE}}\n";
        let out = expand(src);
        assert_eq!(
            out,
            "html = \"\"\"\n<p>{{LINE}}</p>\n\n  # not a comment\\\\\n__END__\n\"\"\"\ny = 7\n"
        );
        assert!(!out.contains("<<<"));
    }

    #[test]
    fn test_literal_block_escapes_string_syntax() {
        let src = "t = <<<T\nhi #{name}\nsay \"\"\"x\"\"\"\nT\n";
        assert_eq!(
            expand(src),
            "t = \"\"\"\nhi \\#{name}\nsay \\\"\\\"\\\"x\\\"\\\"\\\"\n\"\"\"\n"
        );
    }

    #[test]
    fn test_block_strings_pass_through_unexpanded() {
        let src = "doc = \"\"\"\n  {{LINE}}\n  include nothing.part\n  \"\"\"\nn = {{LINE}}\n";
        assert_eq!(
            expand(src),
            "doc = \"\"\"\n  {{LINE}}\n  include nothing.part\n  \"\"\"\nn = 5\n"
        );
    }

    #[test]
    fn test_comment_mentioning_a_literal_opener() {
        let src = "# usage: s = <<<EOT\nx = 1\n";
        assert_eq!(expand(src), src);
    }

    #[test]
    fn test_continuation_stops_at_end_marker() {
        let src = "x = 1 + \\\n__END__\nsecret = 2\n";
        assert_eq!(expand(src), "x = 1 + \\\n");
    }

    #[test]
    fn test_unterminated_literal_block_fails() {
        let err = Preprocessor::new()
            .expand_str("x = 1\ns = <<<EOT\nnever closed\n", Path::new("/v/a.cielo"))
            .unwrap_err();
        match err {
            PreprocessError::UnterminatedLiteral { line, directive, .. } => {
                assert_eq!(line, 2);
                assert_eq!(directive, "s = <<<EOT");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let src = "# c\n\nx = {{LINE}} + \\\n  1\nt = <<<T\n{{FILE}}\nT\n";
        let once = expand(src);
        assert_eq!(once, "# c\n\nx = 3 + 1\nt = \"\"\"\n{{FILE}}\n\"\"\"\n");
        assert_eq!(expand(&once), once);
    }

    #[test]
    fn test_include_is_expanded_in_place() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("shared.part"),
            "greeting = <<<TXT\nhello {{LINE}}\nTXT\nwhere = {{LINE}}\n",
        )
        .unwrap();
        let main = dir.path().join("main.cielo");
        std::fs::write(&main, "a = 1\ninclude \"shared.part\"\nb = {{LINE}}\n").unwrap();

        let out = Preprocessor::new().expand_file(&main).unwrap();
        assert_eq!(
            out,
            "a = 1\ngreeting = \"\"\"\nhello {{LINE}}\n\"\"\"\nwhere = 4\nb = 3\n"
        );
    }

    #[test]
    fn test_include_is_indented_and_uses_own_file_name() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("body.part"), "say '{{FILE}}'\n\nreturn\n").unwrap();
        let main = dir.path().join("main.cielo");
        std::fs::write(&main, "run = () ->\n  #include body.part\n").unwrap();

        let out = Preprocessor::new().expand_file(&main).unwrap();
        assert_eq!(out, "run = () ->\n  say 'body.part'\n\n  return\n");
    }

    #[test]
    fn test_literal_block_in_indented_include_keeps_content_columns() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("p.part"), "t = <<<T\nline one\nT\n").unwrap();
        let main = dir.path().join("main.cielo");
        std::fs::write(&main, "f = ->\n    include p.part\n").unwrap();

        let out = Preprocessor::new().expand_file(&main).unwrap();
        assert_eq!(out, "f = ->\n    t = \"\"\"\nline one\n    \"\"\"\n");
    }

    #[test]
    fn test_include_dirs_are_searched() {
        let dir = TempDir::new().unwrap();
        let lib = dir.path().join("lib");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join("util.part"), "util = true\n").unwrap();
        let main = dir.path().join("main.cielo");
        std::fs::write(&main, "include <util.part>\n").unwrap();

        let out = Preprocessor::new()
            .include_dirs([lib])
            .expand_file(&main)
            .unwrap();
        assert_eq!(out, "util = true\n");
    }

    #[test]
    fn test_missing_include_fails() {
        let dir = TempDir::new().unwrap();
        let main = dir.path().join("main.cielo");
        std::fs::write(&main, "x = 1\ninclude nowhere.part\n").unwrap();

        let err = Preprocessor::new().expand_file(&main).unwrap_err();
        assert!(matches!(err, PreprocessError::MissingInclude { line: 2, .. }));
    }

    #[test]
    fn test_self_include_is_a_cycle() {
        let dir = TempDir::new().unwrap();
        let main = dir.path().join("main.cielo");
        std::fs::write(&main, "include main.cielo\n").unwrap();

        let err = Preprocessor::new().expand_file(&main).unwrap_err();
        assert!(matches!(err, PreprocessError::IncludeCycle { .. }));
    }

    #[test]
    fn test_transitive_cycle_is_detected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.part"), "include b.part\n").unwrap();
        std::fs::write(dir.path().join("b.part"), "x = 1\ninclude a.part\n").unwrap();
        let main = dir.path().join("main.cielo");
        std::fs::write(&main, "include a.part\n").unwrap();

        let err = Preprocessor::new().expand_file(&main).unwrap_err();
        match err {
            PreprocessError::IncludeCycle { file, line, chain, .. } => {
                assert!(file.ends_with("b.part"));
                assert_eq!(line, 2);
                assert_eq!(chain.len(), 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_diamond_include_is_allowed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("leaf.part"), "leaf = 1\n").unwrap();
        let main = dir.path().join("main.cielo");
        std::fs::write(&main, "include leaf.part\ninclude leaf.part\n").unwrap();

        let out = Preprocessor::new().expand_file(&main).unwrap();
        assert_eq!(out, "leaf = 1\nleaf = 1\n");
    }

    #[test]
    fn test_end_marker_in_include_only_ends_that_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("part.part"), "a = 1\n__END__\nb = 2\n").unwrap();
        let main = dir.path().join("main.cielo");
        std::fs::write(&main, "include part.part\nc = 3\n").unwrap();

        let out = Preprocessor::new().expand_file(&main).unwrap();
        assert_eq!(out, "a = 1\nc = 3\n");
    }
}
