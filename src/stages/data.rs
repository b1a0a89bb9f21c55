//! Data-literal wrapping: a `.json5` store becomes an ES module export.

use std::path::Path;

use super::error::StageError;
use crate::source::paths::exposed_stem;

/// Exported binding name for a data-literal source.
///
/// The exposed stem with every non-identifier character replaced by `_`;
/// a leading digit gets a `_` prefix.
pub fn export_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name: String = exposed_stem(&stem)
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Wrap a JSON5 document as `export const <name> = <json>;`.
pub fn wrap_data_literal(raw: &str, exported_name: &str) -> Result<String, StageError> {
    let value: serde_json::Value = serde_json5::from_str(raw).map_err(|e| StageError::Data {
        message: e.to_string(),
        original: raw.to_string(),
    })?;
    let json = serde_json::to_string_pretty(&value).map_err(|e| StageError::Data {
        message: e.to_string(),
        original: raw.to_string(),
    })?;
    Ok(format!("export const {exported_name} = {json};\n"))
}
