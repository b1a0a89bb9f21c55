//! Lightweight CoffeeScript scanner for free and declared identifiers.
//!
//! This is not a parser. It tokenizes enough of the language to tell bare
//! identifier usages apart from property accesses, object keys, strings,
//! comments and block strings, and it recognizes the common binding forms:
//! assignment and destructuring targets, function parameters, `for`
//! variables, `class` names, `catch` bindings and `import` statements.

use std::collections::HashSet;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Op(&'static str),
    Punct(char),
    Literal,
    Newline,
}

const MULTI_OPS: &[&str] = &[
    "...", "||=", "&&=", "->", "=>", "==", "!=", "<=", ">=", "::", "..", "?.", "+=", "-=", "*=",
    "/=", "%=", "?=", "++", "--", "&&", "||",
];

const ASSIGN_OPS: &[&str] = &["||=", "&&=", "?=", "+=", "-=", "*=", "/=", "%="];

static KEYWORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

fn keywords() -> &'static HashSet<&'static str> {
    KEYWORDS.get_or_init(|| {
        [
            "if", "else", "unless", "then", "when", "switch", "while", "until", "loop", "for",
            "in", "of", "by", "own", "return", "break", "continue", "class", "extends", "new",
            "delete", "typeof", "instanceof", "try", "catch", "finally", "throw", "yes", "no",
            "on", "off", "true", "false", "null", "undefined", "this", "super", "and", "or",
            "not", "is", "isnt", "do", "await", "yield", "import", "export", "from", "as",
            "default", "async", "function", "var", "let", "const", "void", "debugger", "with",
        ]
        .into_iter()
        .collect()
    })
}

/// Identifiers found in a chunk of CoffeeScript.
#[derive(Debug, Default, Clone)]
pub struct Bindings {
    /// Bare identifiers in expression position, in first-use order.
    pub used: Vec<String>,
    /// Identifiers bound locally.
    pub declared: HashSet<String>,
}

impl Bindings {
    /// Used identifiers with no local binding.
    pub fn free(&self) -> impl Iterator<Item = &str> {
        self.used
            .iter()
            .map(String::as_str)
            .filter(|name| !self.declared.contains(*name))
    }
}

/// Scan `src` for used and declared identifiers.
pub fn scan(src: &str) -> Bindings {
    let tokens = Lexer::new(src).tokenize();
    Analyzer::new(&tokens).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Vec<Token> {
        self.run(false);
        self.tokens
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn at(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    /// Lex until end of input, or until the `}` closing an interpolation.
    fn run(&mut self, in_interpolation: bool) {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    self.pos += 1;
                    self.tokens.push(Token::Newline);
                }
                c if c.is_whitespace() => self.pos += 1,
                '#' => self.comment(),
                '\'' | '"' | '`' => self.string(c),
                c if is_ident_start(c) => self.ident(),
                c if c.is_ascii_digit() => self.number(),
                '{' => {
                    depth += 1;
                    self.pos += 1;
                    self.tokens.push(Token::Punct('{'));
                }
                '}' => {
                    self.pos += 1;
                    if in_interpolation && depth == 0 {
                        return;
                    }
                    depth = depth.saturating_sub(1);
                    self.tokens.push(Token::Punct('}'));
                }
                _ => self.op(),
            }
        }
    }

    fn comment(&mut self) {
        if self.at("###") && self.peek_at(3) != Some('#') {
            self.pos += 3;
            while self.peek().is_some() && !self.at("###") {
                self.pos += 1;
            }
            self.pos = (self.pos + 3).min(self.chars.len());
        } else {
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                self.pos += 1;
            }
        }
    }

    fn string(&mut self, quote: char) {
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        let delimiter_len = if triple { 3 } else { 1 };
        self.pos += delimiter_len;
        let interpolates = quote == '"';

        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 2;
                continue;
            }
            if interpolates && c == '#' && self.peek_at(1) == Some('{') {
                self.pos += 2;
                self.run(true);
                continue;
            }
            let closes = !triple
                || (self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote));
            if c == quote && closes {
                self.pos += delimiter_len;
                break;
            }
            self.pos += 1;
        }
        self.tokens.push(Token::Literal);
    }

    fn ident(&mut self) {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        self.tokens.push(Token::Ident(word));
    }

    fn number(&mut self) {
        while let Some(c) = self.peek() {
            let fraction = c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit());
            if c.is_ascii_alphanumeric() || c == '_' || fraction {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.tokens.push(Token::Literal);
    }

    fn op(&mut self) {
        for op in MULTI_OPS {
            if self.at(op) {
                self.pos += op.chars().count();
                self.tokens.push(Token::Op(op));
                return;
            }
        }
        if let Some(c) = self.peek() {
            self.pos += 1;
            self.tokens.push(Token::Punct(c));
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

struct Analyzer<'a> {
    tokens: &'a [Token],
    bindings: Bindings,
    seen: HashSet<String>,
}

impl<'a> Analyzer<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            bindings: Bindings::default(),
            seen: HashSet::new(),
        }
    }

    fn run(mut self) -> Bindings {
        let tokens = self.tokens;
        let mut i = 0;
        let mut stmt_start = true;

        while i < tokens.len() {
            let at_start = stmt_start;
            stmt_start = false;

            match &tokens[i] {
                Token::Newline | Token::Punct(';') => {
                    stmt_start = true;
                }
                Token::Ident(word) if at_start && word == "import" => {
                    i = self.import_statement(i + 1);
                    stmt_start = true;
                    continue;
                }
                Token::Ident(word) if word == "for" => self.for_bindings(i + 1),
                Token::Ident(word) if word == "class" || word == "catch" => {
                    if let Some(Token::Ident(name)) = tokens.get(i + 1) {
                        self.declare(name);
                    }
                }
                Token::Ident(name) => self.identifier(i, name),
                Token::Punct('(') => self.parameters(i),
                Token::Punct(open @ ('{' | '[')) if at_start => self.destructuring(i, *open),
                _ => {}
            }
            i += 1;
        }

        self.bindings
    }

    fn prev(&self, i: usize) -> Option<&Token> {
        i.checked_sub(1).and_then(|j| self.tokens.get(j))
    }

    fn declare(&mut self, name: &str) {
        self.bindings.declared.insert(name.to_string());
    }

    fn identifier(&mut self, i: usize, name: &str) {
        if keywords().contains(name) {
            return;
        }
        let is_property = matches!(
            self.prev(i),
            Some(Token::Punct('.' | '@')) | Some(Token::Op("?." | "::"))
        );
        if is_property {
            return;
        }
        let next = self.tokens.get(i + 1);
        if matches!(next, Some(Token::Punct(':'))) {
            return;
        }
        let assigns = matches!(next, Some(Token::Punct('=')))
            || matches!(next, Some(Token::Op(op)) if ASSIGN_OPS.contains(op));
        if assigns {
            self.declare(name);
        }
        if self.seen.insert(name.to_string()) {
            self.bindings.used.push(name.to_string());
        }
    }

    /// Index of the token closing the group opened at `open_idx`.
    fn matching_close(&self, open_idx: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (offset, token) in self.tokens[open_idx..].iter().enumerate() {
            match token {
                Token::Punct('(' | '{' | '[') => depth += 1,
                Token::Punct(')' | '}' | ']') => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open_idx + offset);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// `(a, {b}, c...) ->` binds its parameter names.
    fn parameters(&mut self, open_idx: usize) {
        let Some(close) = self.matching_close(open_idx) else {
            return;
        };
        if !matches!(self.tokens.get(close + 1), Some(Token::Op("->" | "=>"))) {
            return;
        }
        self.bind_group(open_idx, close);
    }

    /// `{a, b} = obj` and `[x, y] = pair` at statement start.
    fn destructuring(&mut self, open_idx: usize, _open: char) {
        let Some(close) = self.matching_close(open_idx) else {
            return;
        };
        if matches!(self.tokens.get(close + 1), Some(Token::Punct('='))) {
            self.bind_group(open_idx, close);
        }
    }

    fn bind_group(&mut self, open_idx: usize, close: usize) {
        let tokens = self.tokens;
        for k in open_idx + 1..close {
            if let Token::Ident(name) = &tokens[k] {
                let binding_position = matches!(
                    self.prev(k),
                    Some(Token::Punct('(' | ',' | '{' | '[' | ':')) | Some(Token::Op("..."))
                );
                let is_key = matches!(tokens.get(k + 1), Some(Token::Punct(':')));
                if binding_position && !is_key {
                    self.declare(name);
                }
            }
        }
    }

    /// `for [own] x[, y] in|of ...`
    fn for_bindings(&mut self, mut i: usize) {
        let tokens = self.tokens;
        while let Some(token) = tokens.get(i) {
            match token {
                Token::Ident(word) if word == "in" || word == "of" => break,
                Token::Ident(word) if word == "own" => {}
                Token::Ident(name) => self.declare(name),
                Token::Newline => break,
                _ => {}
            }
            i += 1;
        }
    }

    /// Consume an `import` statement; returns the index after it.
    ///
    /// Local names are declared; names followed by `as` are the exported
    /// side of a rename and bind nothing.
    fn import_statement(&mut self, mut i: usize) -> usize {
        let tokens = self.tokens;
        let mut depth = 0usize;
        while let Some(token) = tokens.get(i) {
            match token {
                Token::Newline if depth == 0 => return i + 1,
                Token::Punct(';') if depth == 0 => return i + 1,
                Token::Punct('{') => depth += 1,
                Token::Punct('}') => depth = depth.saturating_sub(1),
                Token::Ident(word) if word == "from" || word == "as" => {}
                Token::Ident(name) => {
                    let renamed = matches!(
                        tokens.get(i + 1),
                        Some(Token::Ident(next)) if next == "as"
                    );
                    if !renamed {
                        self.declare(name);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        i
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free(src: &str) -> Vec<String> {
        scan(src).free().map(str::to_string).collect()
    }

    #[test]
    fn test_free_identifiers() {
        assert_eq!(free("say undef\n"), vec!["say", "undef"]);
    }

    #[test]
    fn test_assignment_declares() {
        assert_eq!(free("x = 1\nsay x\n"), vec!["say"]);
        assert_eq!(free("count ?= 0\n"), Vec::<String>::new());
    }

    #[test]
    fn test_properties_and_keys_are_not_free() {
        assert_eq!(free("obj.say()\n@undef\nh = {say: 1}\n"), vec!["obj"]);
        assert_eq!(free("Foo::bar\n"), vec!["Foo"]);
    }

    #[test]
    fn test_strings_and_comments_are_skipped() {
        let src = "# say\n### undef\nsay ###\nx = 'say'\ny = \"\"\"undef\"\"\"\n";
        assert!(free(src).is_empty());
    }

    #[test]
    fn test_interpolation_is_code() {
        assert_eq!(free("msg = \"hi #{name}!\"\n"), vec!["name"]);
    }

    #[test]
    fn test_block_string_content_is_skipped() {
        let src = "html = \"\"\"\n<p>{say}</p> \\#{escaped}\n\"\"\"\nundef\n";
        assert_eq!(free(src), vec!["undef"]);
    }

    #[test]
    fn test_function_parameters() {
        let src = "f = (a, {b, c: d}, rest...) -> a + b + d + rest + say\n";
        assert_eq!(free(src), vec!["say"]);
    }

    #[test]
    fn test_call_arguments_are_not_parameters() {
        assert_eq!(free("say(a, b)\n"), vec!["say", "a", "b"]);
    }

    #[test]
    fn test_loops_classes_and_catch() {
        let src = "for own k, v of obj\n  log k, v\nclass Foo\ntry\n  go()\ncatch err\n  log err\n";
        assert_eq!(free(src), vec!["obj", "log", "go"]);
    }

    #[test]
    fn test_destructuring_assignment() {
        assert_eq!(free("{a, b} = pair\n[x, y] = a\n"), vec!["pair"]);
    }

    #[test]
    fn test_import_statements_bind_locals() {
        let src = "import {say, undef as nothing} from '@jdeighan/coffee-utils'\nimport fs from 'fs'\nsay nothing, fs, undef\n";
        assert_eq!(free(src), vec!["undef"]);
    }
}
