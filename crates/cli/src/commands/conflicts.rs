use anyhow::{anyhow, Context, Result};

use facet_core::conflict::{self, ConflictReport};
use facet_core::config::ProjectLayout;

use crate::canonicalize_or_current;

/// Scan every compiled facet for selector collisions.
///
/// Exits non-zero when two facets claim the same selector, so this can gate
/// CI. Facets without a compiled artifact are reported and skipped.
pub fn check_conflicts_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let report = conflict::scan_project(&layout)
        .context("Failed to scan facet artifacts for selector conflicts")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_conflict_report(&report);
    }

    let conflicting = report.conflicts().len();
    if conflicting == 0 {
        return Ok(());
    }
    Err(anyhow!("{} selector(s) are claimed by more than one facet", conflicting))
}

fn print_conflict_report(report: &ConflictReport) {
    println!("Scanned {} facet artifact(s).", report.scanned().len());
    if !report.skipped().is_empty() {
        println!("Skipped (no compiled artifact): {}", report.skipped().join(", "));
    }

    let conflicts = report.conflicts();
    if conflicts.is_empty() {
        println!(
            "No selector conflicts across {} unique selector(s).",
            report.unique_selectors()
        );
    } else {
        println!();
        println!("Conflicting selectors ({}):", conflicts.len());
        for (selector, claims) in &conflicts {
            println!("  {}:", selector);
            for claim in *claims {
                println!("    - {} ({})", claim.facet, claim.signature);
            }
        }
    }

    println!();
    println!("Selectors by facet:");
    for (facet, selectors) in report.by_facet() {
        println!("  {} ({}):", facet, selectors.len());
        for (selector, signature) in selectors {
            println!("    {}  {}", selector, signature);
        }
    }
}
