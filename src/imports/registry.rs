//! The import symbol registry.
//!
//! A TOML file with a single ordered table mapping bare identifiers to the
//! import statement that binds them:
//!
//! ```toml
//! [symbols]
//! say = "import {say} from '@jdeighan/coffee-utils'"
//! undef = "import {undef} from '@jdeighan/coffee-utils'"
//! writable = "import {writable} from 'svelte/store'"
//! ```
//!
//! File order is registry order; preludes are emitted in that order.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("cannot read symbol registry {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid symbol registry {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// Immutable identifier -> import statement mapping, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSymbolTable {
    #[serde(default)]
    symbols: IndexMap<String, String>,
}

impl ImportSymbolTable {
    /// Build a table from pairs, keeping their order.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            symbols: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load the registry file. A missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        if !path.exists() {
            crate::debug_event!("imports", "no registry", "{}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&content).map_err(|message| RegistryError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        crate::debug_event!("imports", "registry loaded", "{} symbols", table.len());
        Ok(table)
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.symbols.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
