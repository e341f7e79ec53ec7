//! JSON tree data loading and snapshot writing.

use std::path::Path;

use tracing::{debug, instrument};

use crate::application::IoResultExt;
use crate::domain::{NodeSnapshot, RawNode};
use crate::infrastructure::{InfraError, InfraResult};

/// Parse nested `{ label?, value?, children? }` JSON.
pub fn parse_tree(json: &str) -> InfraResult<RawNode> {
    serde_json::from_str(json).map_err(|e| InfraError::parse("tree JSON", e))
}

#[instrument(level = "debug")]
pub fn load_tree(path: &Path) -> InfraResult<RawNode> {
    let content = std::fs::read_to_string(path).with_path_context("read tree data", path)?;
    let raw = serde_json::from_str(&content)
        .map_err(|e| InfraError::parse(path.display().to_string(), e))?;
    debug!("tree data loaded");
    Ok(raw)
}

/// Write a snapshot as pretty JSON.
#[instrument(level = "debug", skip(snapshot))]
pub fn write_snapshot(path: &Path, snapshot: &NodeSnapshot) -> InfraResult<()> {
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| InfraError::parse("serialize snapshot", e))?;
    std::fs::write(path, json)
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))
}
