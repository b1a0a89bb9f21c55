//! Derived artifact naming and path exclusion rules.
//!
//! A derived artifact lives next to its source and differs only by
//! extension. Compiled artifacts (`.js`, `.svelte`) are "exposed": a single
//! leading `_` is dropped from the stem so `_main.coffee` compiles to
//! `main.js`. The first-stage `.coffee` of a macro script keeps its stem.
//! The same rule is used when building and when cascading a deletion.

use std::path::{Component, Path, PathBuf};

use super::kind::{SourceKind, Stage};

/// Directory name holding third-party dependencies; never brewed.
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Leading character of hidden path segments; never brewed.
pub const HIDDEN_MARKER: char = '.';

/// Leading character stripped from compiled artifact names.
pub const EXPOSE_MARKER: char = '_';

/// True if `path` lies under a dependency directory or a hidden segment.
///
/// Segments are taken relative to `root` when the path is inside it, so a
/// root such as `~/.projects/app` does not exclude everything.
pub fn is_excluded(path: &Path, root: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|component| match component {
        Component::Normal(segment) => {
            let segment = segment.to_string_lossy();
            segment == DEPENDENCY_DIR || segment.starts_with(HIDDEN_MARKER)
        }
        _ => false,
    })
}

/// Strip a single leading expose marker from a file stem.
pub fn exposed_stem(stem: &str) -> &str {
    stem.strip_prefix(EXPOSE_MARKER).unwrap_or(stem)
}

/// Path of the artifact `stage` derives from `source`.
pub fn derived_path(source: &Path, stage: Stage) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = if stage.exposes() {
        exposed_stem(&stem).to_string()
    } else {
        stem
    };
    let file_name = format!("{stem}.{}", stage.output_extension());
    match source.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Artifact to delete when a source of `kind` is removed.
///
/// Only the first hop is cascaded: removing a macro script deletes its
/// `.coffee` and leaves the compiled `.js` in place. The orchestrator
/// records that deletion so the watcher's removal event for the `.coffee`
/// does not cascade again.
pub fn cascade_target(source: &Path, kind: SourceKind) -> Option<PathBuf> {
    kind.stage_chain()
        .first()
        .map(|stage| derived_path(source, *stage))
}

/// File name used in log lines and `{{FILE}}` substitution.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Shorten a path for display: relative to `root` when possible.
pub fn short_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}
