use anyhow::{Context, Result};

use facet_core::abi;
use facet_core::config::ProjectLayout;

use crate::canonicalize_or_current;

/// Derive and print the selector table of one compiled facet.
///
/// Selectors come from the Foundry artifact under `out/`, so the project must
/// have been built first.
pub fn selectors_command(root: &str, facet: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let artifact = layout.artifact_path(facet);
    let records = abi::load_records(&artifact)
        .with_context(|| format!("Failed to load selectors for facet '{facet}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("Selectors for {} ({}):", facet, records.len());
    if records.is_empty() {
        println!("  (no externally callable functions)");
        return Ok(());
    }
    for record in &records {
        println!("  {}  {}", record.selector, record.signature);
    }

    Ok(())
}
