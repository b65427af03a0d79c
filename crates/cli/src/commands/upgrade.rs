use std::fs;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::Serialize;

use facet_core::abi::{self, FunctionRecord};
use facet_core::chain::{Address, ChainBackend};
use facet_core::config::{ChainConfig, ProjectLayout};
use facet_core::cut::{plan_calls, CutExecutor, CutReport, ExecutionMode, StepStatus};
use facet_core::loupe::DiamondLoupe;
use facet_core::reconcile::{reconcile, CutAction, CutPlan};
use facet_core::scripts::write_scripts;
use facet_core::selector::SelectorSet;
use facet_core::toolchain::Forge;

use crate::commands::{resolve_backend, resolve_chain_config};
use crate::{canonicalize_or_current, sha256_file};

/// Flags controlling one upgrade run.
#[derive(Debug, Clone, Default)]
pub struct UpgradeOptions {
    pub network: String,
    pub rpc_url: Option<String>,
    pub diamond: Option<String>,
    pub private_key: Option<String>,
    /// Reuse an already-deployed facet instead of running `forge create`.
    pub facet_address: Option<String>,
    pub execute: bool,
    pub sequential: bool,
    pub skip_build: bool,
    pub json: bool,
}

/// Everything the planning phase produces before any state change.
#[derive(Debug)]
pub struct UpgradePlan {
    pub records: Vec<FunctionRecord>,
    pub registry: SelectorSet,
    pub plan: CutPlan,
}

/// Summary of one upgrade run, written to `upgrade-report.json` in the
/// project root.
#[derive(Debug, Serialize)]
pub struct UpgradeReport {
    pub facet: String,
    pub diamond: Address,
    pub network: String,
    pub rpc_url: String,
    pub mode: ExecutionMode,
    pub generated_at: String,
    pub artifact_sha256: String,
    pub functions: Vec<FunctionRecord>,
    pub plan: CutPlan,
    pub scripts: Vec<String>,
    pub facet_address: Option<Address>,
    pub execution: Option<CutReport>,
}

/// Load the facet's compiled interface and reconcile it against the live
/// dispatch table.
///
/// The artifact is read before the first loupe query, so a missing or broken
/// artifact never costs a network round trip.
pub fn plan_upgrade(
    layout: &ProjectLayout,
    facet: &str,
    diamond: Address,
    backend: &dyn ChainBackend,
) -> Result<UpgradePlan> {
    let artifact = layout.artifact_path(facet);
    let records = abi::load_records(&artifact)
        .with_context(|| format!("Failed to load selectors for facet '{facet}'"))?;

    let loupe = DiamondLoupe::new(diamond, backend);
    let registry = loupe
        .all_selectors()
        .with_context(|| format!("Failed to read the dispatch table of diamond {diamond}"))?;

    let plan = reconcile(&records, &registry);
    Ok(UpgradePlan { records, registry, plan })
}

/// Plan (and optionally execute) a diamond upgrade for one facet.
pub fn upgrade_command(root: &str, facet: &str, opts: &UpgradeOptions) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);
    let config = resolve_chain_config(
        &layout,
        &opts.network,
        opts.rpc_url.as_deref(),
        opts.diamond.as_deref(),
        opts.private_key.as_deref(),
    )?;

    if !opts.skip_build {
        if !opts.json {
            println!("Building facets with forge...");
        }
        Forge::new(&layout.root).build().context("Failed to compile the project")?;
    }

    let backend = resolve_backend(&config)?;
    let upgrade = plan_upgrade(&layout, facet, config.diamond, backend.as_ref())?;
    let mode = if opts.sequential { ExecutionMode::Sequential } else { ExecutionMode::Atomic };

    if !opts.json {
        let loupe = DiamondLoupe::new(config.diamond, backend.as_ref());
        print_plan_summary(facet, &upgrade.plan, &loupe)?;
    }

    let scripts = write_scripts(&layout, facet, &upgrade.plan, &config.network)
        .with_context(|| format!("Failed to write scripts to {}", layout.scripts_dir.display()))?;
    if !opts.json && !scripts.is_empty() {
        println!("Wrote {} upgrade script(s):", scripts.len());
        for path in &scripts {
            println!("  {}", path.display());
        }
    }

    let mut facet_address = None;
    let mut execution = None;
    if opts.execute && !upgrade.plan.is_noop() {
        // Remove-only plans route selectors to the zero address and need no
        // deployed facet at all.
        let needs_facet = !upgrade.plan.add.is_empty() || !upgrade.plan.replace.is_empty();
        let target = if needs_facet {
            let address = resolve_facet_address(facet, &layout, &config, opts)?;
            facet_address = Some(address);
            address
        } else {
            Address::ZERO
        };

        let calls = plan_calls(&upgrade.plan, &target, mode);
        let executor = CutExecutor::new(config.diamond, backend.as_ref());
        let report = executor.execute(&calls);
        if !opts.json {
            print_execution_report(&report);
        }
        execution = Some(report);
    }

    let artifact = layout.artifact_path(facet);
    let report = UpgradeReport {
        facet: facet.to_string(),
        diamond: config.diamond,
        network: config.network.clone(),
        rpc_url: config.rpc_url.clone(),
        mode,
        generated_at: Utc::now().to_rfc3339(),
        artifact_sha256: sha256_file(&artifact)?,
        functions: upgrade.records,
        plan: upgrade.plan,
        scripts: scripts.iter().map(|p| p.display().to_string()).collect(),
        facet_address,
        execution,
    };
    let report_path = layout.root.join("upgrade-report.json");
    fs::write(&report_path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Failed to write upgrade report at {}", report_path.display()))?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Report: {}", report_path.display());
        match &report.execution {
            Some(run) if run.succeeded() => println!("Upgrade complete."),
            Some(_) => {}
            None if report.plan.is_noop() => println!("Diamond is already in sync."),
            None => println!("Dry run only; pass --execute to submit the plan."),
        }
    }

    match &report.execution {
        Some(run) if !run.succeeded() => {
            Err(anyhow!("Upgrade did not complete; fix the cause and re-run to converge"))
        }
        _ => Ok(()),
    }
}

/// Address the Add/Replace triples will point at: an explicitly provided one,
/// or a fresh `forge create` deployment.
fn resolve_facet_address(
    facet: &str,
    layout: &ProjectLayout,
    config: &ChainConfig,
    opts: &UpgradeOptions,
) -> Result<Address> {
    if let Some(raw) = &opts.facet_address {
        return Ok(Address::parse(raw)?);
    }

    let key = config.private_key.as_deref().ok_or_else(|| {
        anyhow!("No private key configured; set PRIVATE_KEY or pass --private-key")
    })?;
    if !opts.json {
        println!("Deploying {facet} with forge create...");
    }
    let address = Forge::new(&layout.root)
        .deploy_facet(facet, &config.rpc_url, key)
        .with_context(|| format!("Failed to deploy facet '{facet}'"))?;
    if !opts.json {
        println!("  Deployed {facet} to {address}");
    }
    Ok(address)
}

fn print_plan_summary(facet: &str, plan: &CutPlan, loupe: &DiamondLoupe<'_>) -> Result<()> {
    println!("Reconciled '{}' against diamond {}:", facet, loupe.diamond());
    if plan.is_noop() {
        println!("  Nothing to change; the dispatch table already matches.");
        return Ok(());
    }

    for cut in plan.in_execution_order() {
        if cut.is_empty() {
            continue;
        }
        println!("  {} ({}):", cut.action, cut.len());
        for planned in &cut.functions {
            let mut line = format!("    {}", planned.selector);
            if let Some(sig) = &planned.signature {
                line.push_str(&format!("  {sig}"));
            }
            // Replace and Remove touch live routes; show who serves them now.
            if cut.action != CutAction::Add {
                let owner = loupe.facet_of(planned.selector).with_context(|| {
                    format!("Failed to look up the current owner of {}", planned.selector)
                })?;
                if let Some(address) = owner {
                    line.push_str(&format!("  (currently {address})"));
                }
            }
            println!("{line}");
        }
    }
    Ok(())
}

fn print_execution_report(report: &CutReport) {
    println!("diamondCut submission:");
    for (i, step) in report.steps.iter().enumerate() {
        let outcome = match &step.status {
            StepStatus::Executed { tx: Some(tx) } => format!("executed (tx {tx})"),
            StepStatus::Executed { tx: None } => "executed".to_string(),
            StepStatus::Failed { error } => format!("FAILED: {error}"),
            StepStatus::Skipped => "skipped".to_string(),
        };
        println!("  [{}/{}] {}: {}", i + 1, report.steps.len(), step.description, outcome);
    }
}
