//! Source discovery primitives: classification, exclusion and artifact naming.

mod kind;
pub mod paths;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use kind::{Classification, SourceKind, Stage, kind_of};
pub use paths::{cascade_target, derived_path, display_name, is_excluded, short_path};

/// Maps paths to source kinds for one watched root.
///
/// Excluded paths and disabled formats classify as unrecognized.
#[derive(Debug, Clone)]
pub struct Classifier {
    root: PathBuf,
    enabled: HashSet<SourceKind>,
}

impl Classifier {
    pub fn new(root: impl Into<PathBuf>, enabled: impl IntoIterator<Item = SourceKind>) -> Self {
        Self {
            root: root.into(),
            enabled: enabled.into_iter().collect(),
        }
    }

    /// Classifier with every format enabled.
    pub fn all(root: impl Into<PathBuf>) -> Self {
        Self::new(root, SourceKind::ALL)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        is_excluded(path, &self.root)
    }

    pub fn is_enabled(&self, kind: SourceKind) -> bool {
        self.enabled.contains(&kind)
    }

    pub fn classify(&self, path: &Path) -> Classification {
        if self.is_excluded(path) {
            return Classification::UNRECOGNIZED;
        }
        let kind = kind_of(path);
        if kind.is_recognized() && self.is_enabled(kind) {
            Classification::of(kind)
        } else {
            Classification::UNRECOGNIZED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_respects_exclusions_and_formats() {
        let classifier = Classifier::new("/app", [SourceKind::MacroScript]);

        let c = classifier.classify(Path::new("/app/src/main.cielo"));
        assert_eq!(c.kind, SourceKind::MacroScript);
        assert_eq!(c.chain.len(), 2);

        // Disabled format
        let c = classifier.classify(Path::new("/app/src/main.coffee"));
        assert_eq!(c, Classification::UNRECOGNIZED);

        // Excluded even though the format is enabled
        let c = classifier.classify(Path::new("/app/node_modules/lib/x.cielo"));
        assert_eq!(c, Classification::UNRECOGNIZED);
    }

    #[test]
    fn test_all_formats() {
        let classifier = Classifier::all("/app");
        for (name, kind) in [
            ("a.cielo", SourceKind::MacroScript),
            ("a.coffee", SourceKind::IntermediateScript),
            ("a.starbucks", SourceKind::ComponentTemplate),
            ("a.json5", SourceKind::DataLiteral),
        ] {
            assert_eq!(classifier.classify(&Path::new("/app").join(name)).kind, kind);
        }
    }
}
