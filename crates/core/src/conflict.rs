//! Project-wide duplicate-selector detection.
//!
//! A diamond routes by a flat selector-to-facet map, so no two facets in one
//! project may claim the same 4-byte selector; a collision deploys as silent
//! misrouting. The scanner loads every facet's compiled interface and reports
//! each selector claimed more than once.
//!
//! Unlike reconciliation, scanning degrades gracefully: a facet whose
//! artifact is missing is skipped with a warning, since partial results still
//! expose conflicts among the facets that did compile.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::abi::{load_records, ArtifactError};
use crate::config::ProjectLayout;
use crate::selector::Selector;

/// One facet's claim on a selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorClaim {
    pub facet: String,
    pub signature: String,
}

/// Outcome of a full-project scan. Holds every claim, not just the
/// conflicting ones, so callers can also render a per-facet selector listing.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictReport {
    claims: BTreeMap<Selector, Vec<SelectorClaim>>,
    scanned: Vec<String>,
    skipped: Vec<String>,
}

impl ConflictReport {
    /// Selectors claimed by more than one facet, ascending by selector.
    pub fn conflicts(&self) -> Vec<(Selector, &[SelectorClaim])> {
        self.claims
            .iter()
            .filter(|(_, claims)| claims.len() > 1)
            .map(|(sel, claims)| (*sel, claims.as_slice()))
            .collect()
    }

    pub fn has_conflicts(&self) -> bool {
        self.claims.values().any(|claims| claims.len() > 1)
    }

    /// Count of distinct selectors seen across all scanned facets.
    pub fn unique_selectors(&self) -> usize {
        self.claims.len()
    }

    /// Facets whose artifacts were loaded, in scan order.
    pub fn scanned(&self) -> &[String] {
        &self.scanned
    }

    /// Facets skipped because their artifact was missing.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// All claims regrouped per facet, sorted by signature within each facet.
    pub fn by_facet(&self) -> BTreeMap<&str, Vec<(Selector, &str)>> {
        let mut out: BTreeMap<&str, Vec<(Selector, &str)>> = BTreeMap::new();
        for (sel, claims) in &self.claims {
            for claim in claims {
                out.entry(claim.facet.as_str()).or_default().push((*sel, claim.signature.as_str()));
            }
        }
        for entries in out.values_mut() {
            entries.sort_by(|a, b| a.1.cmp(b.1));
        }
        out
    }
}

/// List facet contract names under a facets directory: every `*Facet.sol`
/// file, by its stem, sorted. A missing or unreadable directory yields an
/// empty list.
pub fn discover_facets(facets_dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(facets_dir) else {
        warn!(dir = %facets_dir.display(), "facets directory not readable");
        return Vec::new();
    };
    let mut facets: Vec<String> = entries
        .filter_map(|entry| {
            let name = entry.ok()?.file_name().to_string_lossy().to_string();
            name.strip_suffix(".sol")
                .filter(|stem| stem.ends_with("Facet"))
                .map(|stem| stem.to_string())
        })
        .collect();
    facets.sort();
    facets
}

/// Scan the named facets for duplicate selectors.
///
/// Missing artifacts are skipped with a warning; unreadable or malformed
/// artifacts abort the scan, since they point at corruption rather than an
/// uncompiled facet.
pub fn scan(layout: &ProjectLayout, facets: &[String]) -> Result<ConflictReport, ArtifactError> {
    let mut claims: BTreeMap<Selector, Vec<SelectorClaim>> = BTreeMap::new();
    let mut scanned = Vec::new();
    let mut skipped = Vec::new();

    for facet in facets {
        let path = layout.artifact_path(facet);
        let records = match load_records(&path) {
            Ok(records) => records,
            Err(ArtifactError::NotFound(path)) => {
                warn!(facet, path = %path.display(), "skipping facet, artifact not found");
                skipped.push(facet.clone());
                continue;
            }
            Err(other) => return Err(other),
        };
        for record in records {
            claims
                .entry(record.selector)
                .or_default()
                .push(SelectorClaim { facet: facet.clone(), signature: record.signature });
        }
        scanned.push(facet.clone());
    }

    let report = ConflictReport { claims, scanned, skipped };
    debug!(
        facets = report.scanned.len(),
        selectors = report.unique_selectors(),
        conflicts = report.conflicts().len(),
        "scan complete"
    );
    Ok(report)
}

/// Discover every facet under the project layout and scan them all.
pub fn scan_project(layout: &ProjectLayout) -> Result<ConflictReport, ArtifactError> {
    scan(layout, &discover_facets(&layout.facets_dir))
}
