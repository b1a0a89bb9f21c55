//! Import prelude synthesis.

use std::collections::HashSet;

use super::registry::ImportSymbolTable;
use super::scanner::scan;

/// Synthesizes import preludes for free identifiers found in the registry.
#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
    table: ImportSymbolTable,
}

impl ImportResolver {
    pub fn new(table: ImportSymbolTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ImportSymbolTable {
        &self.table
    }

    /// Registry symbols used but not bound in `text`, in registry order.
    ///
    /// Free identifiers the registry does not know are ignored.
    pub fn needed_symbols(&self, text: &str) -> Vec<String> {
        if self.table.is_empty() {
            return Vec::new();
        }
        let bindings = scan(text);
        let free: HashSet<&str> = bindings.free().collect();
        self.table
            .iter()
            .filter(|(name, _)| free.contains(name))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// The import prelude for `text`, possibly empty.
    ///
    /// One statement per needed symbol, in registry order. Symbols sharing
    /// a statement produce it once.
    pub fn resolve_imports(&self, text: &str) -> String {
        let mut seen = HashSet::new();
        let statements: Vec<&str> = self
            .needed_symbols(text)
            .iter()
            .filter_map(|name| self.table.get(name))
            .filter(|stmt| seen.insert(*stmt))
            .collect();
        statements.join("\n")
    }

    /// `text` with its prelude prepended, separated by one blank line.
    ///
    /// Text that needs nothing is returned unchanged, so applying twice
    /// never duplicates imports.
    pub fn apply(&self, text: &str) -> String {
        let prelude = self.resolve_imports(text);
        if prelude.is_empty() {
            return text.to_string();
        }
        let combined = format!("{prelude}\n\n{}", text.trim_start_matches(['\n', '\r']));

        let remaining = self.needed_symbols(&combined);
        if !remaining.is_empty() {
            tracing::warn!(
                "[imports] prelude left symbols unbound: {}",
                remaining.join(", ")
            );
        }
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ImportResolver {
        ImportResolver::new(ImportSymbolTable::from_pairs([
            ("undef", "import {undef, say} from '@jdeighan/coffee-utils'"),
            ("say", "import {undef, say} from '@jdeighan/coffee-utils'"),
            ("writable", "import {writable} from 'svelte/store'"),
            ("log", "import {log} from '@jdeighan/coffee-utils/log'"),
        ]))
    }

    #[test]
    fn test_registry_order_not_usage_order() {
        let r = resolver();
        let text = "log 'start'\nstore = writable(0)\nsay undef\n";
        assert_eq!(r.needed_symbols(text), vec!["undef", "say", "writable", "log"]);
        assert_eq!(
            r.resolve_imports(text),
            "import {undef, say} from '@jdeighan/coffee-utils'\n\
             import {writable} from 'svelte/store'\n\
             import {log} from '@jdeighan/coffee-utils/log'"
        );
    }

    #[test]
    fn test_unknown_and_local_identifiers_are_ignored() {
        let r = resolver();
        let text = "log = console.log\nlog mystery\n";
        assert!(r.needed_symbols(text).is_empty());
        assert_eq!(r.resolve_imports(text), "");
    }

    #[test]
    fn test_apply_separates_with_one_blank_line() {
        let r = resolver();
        let out = r.apply("\n\nsay 'hi'\n");
        assert_eq!(
            out,
            "import {undef, say} from '@jdeighan/coffee-utils'\n\nsay 'hi'\n"
        );
    }

    #[test]
    fn test_apply_is_idempotent() {
        let r = resolver();
        let once = r.apply("say 'hi'\nx = writable(1)\n");
        let twice = r.apply(&once);
        assert_eq!(once, twice);
        assert_eq!(once.matches("svelte/store").count(), 1);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let r = resolver();
        let text = "writable say log undef\n";
        let first = r.resolve_imports(text);
        for _ in 0..10 {
            assert_eq!(r.resolve_imports(text), first);
        }
    }

    #[test]
    fn test_nothing_needed_leaves_text_alone() {
        let r = resolver();
        assert_eq!(r.apply("x = 1\n"), "x = 1\n");
        assert_eq!(ImportResolver::default().apply("say 1\n"), "say 1\n");
    }
}
