//! Line-level syntax of the macro language.

use std::sync::OnceLock;

use regex::Regex;

/// Token replaced with the display name of the file being expanded.
pub const FILE_TOKEN: &str = "{{FILE}}";

/// Token replaced with the 1-based physical line number of its occurrence.
pub const LINE_TOKEN: &str = "{{LINE}}";

/// A line consisting solely of this token ends the input.
pub const END_TOKEN: &str = "__END__";

/// Trailing marker joining a physical line with the next one.
pub const CONTINUATION: char = '\\';

/// CoffeeScript block string delimiter; literal blocks are emitted as one.
pub const BLOCK_QUOTE: &str = "\"\"\"";

static LITERAL_OPEN: OnceLock<Regex> = OnceLock::new();
static INCLUDE: OnceLock<Regex> = OnceLock::new();

fn literal_open_re() -> &'static Regex {
    LITERAL_OPEN.get_or_init(|| {
        Regex::new(r"<<<([A-Za-z_][A-Za-z0-9_]*)\s*$").expect("literal block regex")
    })
}

fn include_re() -> &'static Regex {
    INCLUDE.get_or_init(|| {
        Regex::new(r"^(\s*)#?include\s+(\S.*?)\s*$").expect("include regex")
    })
}

/// What a logical line is, in dispatch priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `__END__`: discard the rest of the input.
    End,
    /// `head <<<TAG`: opens a literal block terminated by a line equal to `tag`.
    LiteralOpen { head: &'a str, tag: &'a str },
    /// Opens a CoffeeScript block string; copied through its closing quotes.
    BlockString,
    /// `include <target>` with the directive's indentation.
    Include { indent: &'a str, target: &'a str },
    Blank,
    Comment,
    Code,
}

/// Classify a logical line (after continuation joining and token substitution).
pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed == END_TOKEN {
        return LineKind::End;
    }
    let comment = is_comment(line);
    if !comment {
        if let Some(caps) = literal_open_re().captures(line) {
            if let (Some(all), Some(tag)) = (caps.get(0), caps.get(1)) {
                return LineKind::LiteralOpen {
                    head: &line[..all.start()],
                    tag: tag.as_str(),
                };
            }
        }
        if line.matches(BLOCK_QUOTE).count() % 2 == 1 {
            return LineKind::BlockString;
        }
    }
    if let Some(caps) = include_re().captures(line) {
        let indent = caps.get(1).map_or("", |m| m.as_str());
        let target = caps.get(2).map_or("", |m| m.as_str());
        return LineKind::Include {
            indent,
            target: unquote(target),
        };
    }
    if trimmed.is_empty() {
        LineKind::Blank
    } else if comment {
        LineKind::Comment
    } else {
        LineKind::Code
    }
}

/// True if the physical line is a `#` comment.
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// True if the line ends with the continuation marker.
pub fn continues(line: &str) -> bool {
    !is_comment(line) && line.trim_end().ends_with(CONTINUATION)
}

/// Join a continued line with the next physical line.
pub fn join_continuation(head: &str, next: &str) -> String {
    let head = head.trim_end();
    let head = head.strip_suffix(CONTINUATION).unwrap_or(head).trim_end();
    format!("{head} {}", next.trim_start())
}

/// True if `line` terminates the literal block opened with `tag`.
pub fn closes_literal(line: &str, tag: &str) -> bool {
    line.trim() == tag
}

/// True if `line` closes an open block string.
pub fn closes_block_string(line: &str) -> bool {
    line.contains(BLOCK_QUOTE)
}

/// Escape one literal-block line for use inside a block string.
///
/// The string value is the line as written: backslashes, `"""` and `#{`
/// are the only sequences a block string would otherwise interpret.
pub fn escape_block_line(line: &str) -> String {
    if !line.contains(['\\', '"', '#']) {
        return line.to_string();
    }
    line.replace('\\', "\\\\")
        .replace(BLOCK_QUOTE, "\\\"\\\"\\\"")
        .replace("#{", "\\#{")
}

/// Leading whitespace of a line.
pub fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Replace `{{FILE}}` and `{{LINE}}` in one physical line.
pub fn substitute_tokens(line: &str, file_name: &str, line_number: usize) -> String {
    if !line.contains("{{") {
        return line.to_string();
    }
    line.replace(FILE_TOKEN, file_name)
        .replace(LINE_TOKEN, &line_number.to_string())
}

fn unquote(target: &str) -> &str {
    for (open, close) in [('"', '"'), ('\'', '\''), ('<', '>')] {
        if let Some(inner) = target
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    target
}
