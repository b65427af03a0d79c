//! Turning a [`CutPlan`] into diamondCut submissions.
//!
//! Two execution shapes exist. Atomic (the default) folds every non-empty
//! action into one diamondCut call, so the dispatch table moves between two
//! valid states in one transaction. Sequential issues one call per action in
//! the fixed order Replace, Add, Remove, matching older operational tooling;
//! a failure mid-stream leaves the diamond partially reconciled but
//! individually valid, and a re-run converges because reconciliation is
//! idempotent.
//!
//! The init hook of diamondCut is always passed as a no-op
//! `(address(0), "0x")`; initializer dispatch is out of scope here.

use serde::Serialize;
use tracing::{debug, warn};

use crate::chain::{Address, ChainBackend};
use crate::reconcile::{CutAction, CutPlan};
use crate::selector::Selector;

/// The mutating diamond entry point, in cast's human-readable form.
pub const DIAMOND_CUT_SIG: &str = "diamondCut((address,uint8,bytes4[])[],address,bytes)";

const NO_INIT_CALLDATA: &str = "0x";

/// How cut calls are batched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionMode {
    /// One diamondCut call carrying every non-empty action.
    Atomic,
    /// One diamondCut call per action, Replace then Add then Remove.
    Sequential,
}

/// One `(facetAddress, action, selectors)` triple of the diamondCut calldata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetCut {
    pub facet: Address,
    pub action: CutAction,
    pub selectors: Vec<Selector>,
}

/// One diamondCut submission, carrying one or more triples.
#[derive(Debug, Clone)]
pub struct CutCall {
    pub cuts: Vec<FacetCut>,
}

impl CutCall {
    /// Human-readable label for summaries and step reports.
    pub fn label(&self) -> String {
        let parts: Vec<String> =
            self.cuts.iter().map(|c| format!("{} {}", c.action, c.selectors.len())).collect();
        parts.join(" + ")
    }

    /// The three positional arguments of diamondCut, encoded the way cast
    /// expects them on the command line.
    pub fn encode_args(&self) -> Vec<String> {
        vec![encode_cuts_arg(&self.cuts), Address::ZERO.to_string(), NO_INIT_CALLDATA.to_string()]
    }
}

/// Encode a triple list as a cast tuple-array literal, e.g.
/// `[(0xabc...,0,[0x12345678,0x9abcdef0]),(0x000...,2,[0x11111111])]`.
pub fn encode_cuts_arg(cuts: &[FacetCut]) -> String {
    let triples: Vec<String> = cuts
        .iter()
        .map(|cut| {
            let sels: Vec<String> = cut.selectors.iter().map(Selector::to_string).collect();
            format!("({},{},[{}])", cut.facet, cut.action.encoding(), sels.join(","))
        })
        .collect();
    format!("[{}]", triples.join(","))
}

/// Lay a plan out as concrete diamondCut calls.
///
/// Add and Replace triples carry the new facet's address; Remove triples must
/// carry the zero address (the diamond rejects anything else). Empty actions
/// produce no triple, and a no-op plan produces no calls at all.
pub fn plan_calls(plan: &CutPlan, new_facet: &Address, mode: ExecutionMode) -> Vec<CutCall> {
    let mut triples = Vec::new();
    for cut in plan.in_execution_order() {
        if cut.is_empty() {
            continue;
        }
        let facet = match cut.action {
            CutAction::Remove => Address::ZERO,
            CutAction::Add | CutAction::Replace => *new_facet,
        };
        triples.push(FacetCut { facet, action: cut.action, selectors: cut.selectors() });
    }
    if triples.is_empty() {
        return Vec::new();
    }
    match mode {
        ExecutionMode::Atomic => vec![CutCall { cuts: triples }],
        ExecutionMode::Sequential => {
            triples.into_iter().map(|t| CutCall { cuts: vec![t] }).collect()
        }
    }
}

/// Outcome of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StepStatus {
    Executed { tx: Option<String> },
    Failed { error: String },
    /// Not attempted because an earlier step failed.
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub description: String,
    pub status: StepStatus,
}

/// Per-step record of an execution run. A failed step never aborts the
/// report; later steps are recorded as skipped so the operator sees exactly
/// what state the diamond was left in.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CutReport {
    pub steps: Vec<StepReport>,
}

impl CutReport {
    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(|s| matches!(s.status, StepStatus::Executed { .. }))
    }
}

/// Submits cut calls against one diamond through a [`ChainBackend`].
pub struct CutExecutor<'a> {
    diamond: Address,
    backend: &'a dyn ChainBackend,
}

impl<'a> CutExecutor<'a> {
    pub fn new(diamond: Address, backend: &'a dyn ChainBackend) -> Self {
        Self { diamond, backend }
    }

    /// Run the calls in order, stopping submissions at the first failure.
    pub fn execute(&self, calls: &[CutCall]) -> CutReport {
        let mut report = CutReport::default();
        let mut failed = false;
        for call in calls {
            let description = call.label();
            if failed {
                report.steps.push(StepReport { description, status: StepStatus::Skipped });
                continue;
            }
            debug!(diamond = %self.diamond, step = %description, "submitting diamondCut");
            match self.backend.send(&self.diamond, DIAMOND_CUT_SIG, &call.encode_args()) {
                Ok(output) => {
                    let status = StepStatus::Executed { tx: extract_tx_hash(&output) };
                    report.steps.push(StepReport { description, status });
                }
                Err(e) => {
                    warn!(step = %description, error = %e, "diamondCut submission failed");
                    failed = true;
                    let status = StepStatus::Failed { error: e.to_string() };
                    report.steps.push(StepReport { description, status });
                }
            }
        }
        report
    }
}

/// Pull the transaction hash out of a cast receipt, which prints
/// `transactionHash` followed by the hash on the same line.
fn extract_tx_hash(output: &str) -> Option<String> {
    let mut tokens = output.split_whitespace();
    while let Some(tok) = tokens.next() {
        if tok == "transactionHash" {
            return tokens.next().map(str::to_string);
        }
    }
    None
}
