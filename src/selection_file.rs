//! Saving and loading selections as JSON, for `setup --save-selection` and `apply`.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::selection::Selection;

/// Save a selection to a JSON file
pub fn save_selection<P: AsRef<Path>>(selection: &Selection, path: P) -> Result<()> {
    let json =
        serde_json::to_string_pretty(selection).context("Failed to serialize selection to JSON")?;

    fs::write(&path, json)
        .with_context(|| format!("Failed to write selection to {:?}", path.as_ref()))?;

    Ok(())
}

/// Load a selection from a JSON file and validate it.
///
/// Repeated plugins are dropped the same way as for interactive answers.
pub fn load_selection<P: AsRef<Path>>(path: P) -> Result<Selection> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read selection from {:?}", path.as_ref()))?;

    let raw: Selection =
        serde_json::from_str(&content).context("Failed to parse selection JSON")?;

    let (selection, _) = Selection::new(
        raw.theme(),
        raw.plugins().iter().cloned(),
        raw.alias_mode(),
        raw.function_mode(),
    );
    selection
        .validate()
        .with_context(|| format!("Invalid selection in {:?}", path.as_ref()))?;

    Ok(selection)
}
