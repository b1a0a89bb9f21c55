//! Source kinds and the stage chains that derive artifacts from them.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// The closed set of source formats the brewer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// `.cielo` - line-oriented macro script, expanded to CoffeeScript.
    MacroScript,
    /// `.coffee` - intermediate script handed to the script compiler.
    IntermediateScript,
    /// `.starbucks` - markup + script component template.
    ComponentTemplate,
    /// `.json5` - structured data literal, wrapped into a module.
    DataLiteral,
    /// Anything else. Ignored while scanning, fatal when named explicitly.
    Unrecognized,
}

/// A single transformation hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Macro expansion plus import prelude (`.cielo` -> `.coffee`).
    Preprocess,
    /// Downstream script compiler (`.coffee` -> `.js`).
    CompileScript,
    /// Downstream template compiler (`.starbucks` -> `.svelte`).
    CompileTemplate,
    /// Data-literal wrapping (`.json5` -> `.js`).
    WrapData,
}

const MACRO_CHAIN: &[Stage] = &[Stage::Preprocess, Stage::CompileScript];
const SCRIPT_CHAIN: &[Stage] = &[Stage::CompileScript];
const TEMPLATE_CHAIN: &[Stage] = &[Stage::CompileTemplate];
const DATA_CHAIN: &[Stage] = &[Stage::WrapData];

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::MacroScript,
        SourceKind::IntermediateScript,
        SourceKind::ComponentTemplate,
        SourceKind::DataLiteral,
    ];

    /// Map a file extension (without the dot) to a kind.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "cielo" => SourceKind::MacroScript,
            "coffee" => SourceKind::IntermediateScript,
            "starbucks" => SourceKind::ComponentTemplate,
            "json5" => SourceKind::DataLiteral,
            _ => SourceKind::Unrecognized,
        }
    }

    /// Ordered stages applied to a source of this kind.
    pub fn stage_chain(self) -> &'static [Stage] {
        match self {
            SourceKind::MacroScript => MACRO_CHAIN,
            SourceKind::IntermediateScript => SCRIPT_CHAIN,
            SourceKind::ComponentTemplate => TEMPLATE_CHAIN,
            SourceKind::DataLiteral => DATA_CHAIN,
            SourceKind::Unrecognized => &[],
        }
    }

    pub fn is_recognized(self) -> bool {
        self != SourceKind::Unrecognized
    }

    /// Short tag used in log lines and configuration.
    pub fn config_key(self) -> &'static str {
        match self {
            SourceKind::MacroScript => "cielo",
            SourceKind::IntermediateScript => "coffee",
            SourceKind::ComponentTemplate => "starbucks",
            SourceKind::DataLiteral => "data",
            SourceKind::Unrecognized => "unknown",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::MacroScript => "macro-script",
            SourceKind::IntermediateScript => "intermediate-script",
            SourceKind::ComponentTemplate => "component-template",
            SourceKind::DataLiteral => "data-literal",
            SourceKind::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

impl Stage {
    /// Extension of the artifact this stage writes.
    pub fn output_extension(self) -> &'static str {
        match self {
            Stage::Preprocess => "coffee",
            Stage::CompileScript | Stage::WrapData => "js",
            Stage::CompileTemplate => "svelte",
        }
    }

    /// Whether the artifact is externally visible and gets the exposing transform.
    pub fn exposes(self) -> bool {
        !matches!(self, Stage::Preprocess)
    }
}

/// Result of classifying a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: SourceKind,
    pub chain: &'static [Stage],
}

impl Classification {
    pub const UNRECOGNIZED: Classification = Classification {
        kind: SourceKind::Unrecognized,
        chain: &[],
    };

    pub fn of(kind: SourceKind) -> Self {
        Self {
            kind,
            chain: kind.stage_chain(),
        }
    }
}

/// Classify a path by extension, ignoring exclusions and enabled formats.
pub fn kind_of(path: &Path) -> SourceKind {
    path.extension()
        .and_then(|e| e.to_str())
        .map(SourceKind::from_extension)
        .unwrap_or(SourceKind::Unrecognized)
}
