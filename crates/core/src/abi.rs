//! Facet interface loading from compiled artifacts.
//!
//! Foundry writes one artifact JSON per contract (`out/<Facet>.sol/<Facet>.json`)
//! with an `"abi"` array. Only externally callable `"function"` entries matter
//! here; constructors, events, errors, and fallback/receive entries never get
//! selectors in the dispatch table and are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::selector::{selector, Selector};

/// One externally callable function of a facet, with its canonical signature
/// and derived selector. Immutable once built.
///
/// Uniqueness of `selector` within one facet is not guaranteed by
/// construction; the conflict scanner is what verifies it across a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionRecord {
    pub name: String,
    pub signature: String,
    pub selector: Selector,
}

/// Error type for artifact loading.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The facet has no compiled artifact. Fatal for reconciliation,
    /// skip-with-warning for conflict scanning.
    #[error("Compiled artifact not found at {0} (run 'forge build' first)")]
    NotFound(PathBuf),

    #[error("Failed to read artifact {path}: {detail}")]
    Io { path: PathBuf, detail: String },

    #[error("Failed to parse artifact {path}: {detail}")]
    Parse { path: PathBuf, detail: String },
}

#[derive(Debug, Deserialize)]
struct Artifact {
    #[serde(default)]
    abi: Vec<AbiEntry>,
}

#[derive(Debug, Deserialize)]
struct AbiEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<AbiInput>,
}

/// One parameter of an ABI entry. `kind` is the raw ABI type string
/// (`"uint256"`, `"tuple[]"`, ...); struct parameters carry `components`.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiInput {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub components: Option<Vec<AbiInput>>,
}

/// Render one parameter's canonical type string.
///
/// Struct parameters appear in the ABI as `"tuple"` (possibly with an array
/// suffix) plus a `components` list; the canonical encoding expands them to a
/// parenthesized component list, e.g. `(uint256,address)[]`.
fn type_string(input: &AbiInput) -> String {
    if let Some(rest) = input.kind.strip_prefix("tuple") {
        let inner: Vec<String> =
            input.components.as_deref().unwrap_or_default().iter().map(type_string).collect();
        format!("({}){rest}", inner.join(","))
    } else {
        input.kind.clone()
    }
}

/// Build the canonical signature `name(type1,type2,...)`.
///
/// Parameter names are discarded; only type strings participate. This is the
/// exact string the selector is derived from.
pub fn canonical_signature(name: &str, inputs: &[AbiInput]) -> String {
    let params: Vec<String> = inputs.iter().map(type_string).collect();
    format!("{name}({})", params.join(","))
}

/// Load all function records from an artifact file, in declaration order.
///
/// Declaration order carries no semantic meaning but is preserved so output
/// listings match the source layout operators know.
pub fn load_records(path: &Path) -> Result<Vec<FunctionRecord>, ArtifactError> {
    if !path.is_file() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }
    let body = fs::read_to_string(path)
        .map_err(|e| ArtifactError::Io { path: path.to_path_buf(), detail: e.to_string() })?;
    let artifact: Artifact = serde_json::from_str(&body)
        .map_err(|e| ArtifactError::Parse { path: path.to_path_buf(), detail: e.to_string() })?;

    let mut records = Vec::new();
    for entry in &artifact.abi {
        if entry.kind != "function" {
            continue;
        }
        let Some(name) = &entry.name else {
            continue;
        };
        let signature = canonical_signature(name, &entry.inputs);
        let sel = selector(&signature);
        records.push(FunctionRecord { name: name.clone(), signature, selector: sel });
    }
    debug!(artifact = %path.display(), functions = records.len(), "loaded facet interface");
    Ok(records)
}
