//! The reconciliation core: a three-way set diff between a facet's compiled
//! interface and a diamond's live dispatch table.
//!
//! Everything here is pure set algebra over [`Selector`] values. The produced
//! plan is deterministic for a given input pair; callers can re-run it freely
//! and converge (applying a plan and reconciling again yields Replace-only).

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::abi::FunctionRecord;
use crate::selector::{Selector, SelectorSet};

/// The three diamond-cut action kinds. Discriminants match the on-chain
/// `FacetCutAction` enum encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CutAction {
    Add,
    Replace,
    Remove,
}

impl CutAction {
    /// The numeric value the diamondCut calldata expects.
    pub fn encoding(self) -> u8 {
        match self {
            CutAction::Add => 0,
            CutAction::Replace => 1,
            CutAction::Remove => 2,
        }
    }
}

impl fmt::Display for CutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CutAction::Add => "Add",
            CutAction::Replace => "Replace",
            CutAction::Remove => "Remove",
        })
    }
}

/// One function slot affected by a cut. Selector and signature travel
/// together so consumers can never mispair them by index; Remove entries
/// carry no signature because the chain does not expose removed functions'
/// sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedFunction {
    pub selector: Selector,
    pub signature: Option<String>,
}

/// All functions planned under one action kind, sorted ascending by selector
/// and deduplicated.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedCut {
    pub action: CutAction,
    pub functions: Vec<PlannedFunction>,
}

impl PlannedCut {
    fn new(action: CutAction, functions: Vec<PlannedFunction>) -> Self {
        Self { action, functions }
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// The selectors of this cut, in ascending order.
    pub fn selectors(&self) -> Vec<Selector> {
        self.functions.iter().map(|f| f.selector).collect()
    }
}

/// The full reconciliation outcome: three pairwise-disjoint cuts whose
/// selector union equals `new ∪ registry`.
#[derive(Debug, Clone, Serialize)]
pub struct CutPlan {
    pub add: PlannedCut,
    pub replace: PlannedCut,
    pub remove: PlannedCut,
}

impl CutPlan {
    /// True when the dispatch table already matches the facet interface
    /// (nothing to add or remove) and there is nothing to re-route either.
    pub fn is_noop(&self) -> bool {
        self.add.is_empty() && self.replace.is_empty() && self.remove.is_empty()
    }

    /// The three cuts in execution order: Replace, then Add, then Remove.
    pub fn in_execution_order(&self) -> [&PlannedCut; 3] {
        [&self.replace, &self.add, &self.remove]
    }
}

/// Compute the minimal cut plan bringing `registry` in sync with
/// `new_records`.
///
/// - Add: selectors the facet has and the diamond lacks.
/// - Replace: selectors both have; the new facet takes over routing from
///   whatever facet currently owns them, with no lineage check.
/// - Remove: selectors the diamond has and the facet lacks.
///
/// Empty `new_records` turns the whole dispatch table into removals; an
/// empty registry (fresh diamond) makes everything an Add. Duplicate
/// selectors within `new_records` collapse (a within-facet collision is a
/// defect the conflict scanner reports separately).
pub fn reconcile(new_records: &[FunctionRecord], registry: &SelectorSet) -> CutPlan {
    let mut signature_of: BTreeMap<Selector, &str> = BTreeMap::new();
    for record in new_records {
        signature_of.entry(record.selector).or_insert(record.signature.as_str());
    }
    let new_ids: SelectorSet = signature_of.keys().copied().collect();

    let known = |sel: &Selector| PlannedFunction {
        selector: *sel,
        signature: signature_of.get(sel).map(|s| s.to_string()),
    };

    // BTreeSet difference/intersection iterate ascending, so each cut comes
    // out sorted and deduplicated by construction.
    let add: Vec<PlannedFunction> = new_ids.difference(registry).map(known).collect();
    let replace: Vec<PlannedFunction> = new_ids.intersection(registry).map(known).collect();
    let remove: Vec<PlannedFunction> = registry
        .difference(&new_ids)
        .map(|sel| PlannedFunction { selector: *sel, signature: None })
        .collect();

    debug!(add = add.len(), replace = replace.len(), remove = remove.len(), "reconciled");
    CutPlan {
        add: PlannedCut::new(CutAction::Add, add),
        replace: PlannedCut::new(CutAction::Replace, replace),
        remove: PlannedCut::new(CutAction::Remove, remove),
    }
}
