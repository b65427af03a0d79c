//! Generated Foundry upgrade scripts.
//!
//! For each non-empty action of a plan, one runnable forge script lands in
//! the project's `script/` directory. These are an operational escape hatch:
//! the selectors are frozen into the file as a fixed-length array, so the
//! exact reviewed diff can be broadcast later (or by someone else) without
//! re-running reconciliation. The files are generated text only; nothing
//! here reads them back.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use crate::config::ProjectLayout;
use crate::reconcile::{CutAction, CutPlan, PlannedCut};

/// File name for one action's script, e.g. `AddFacet.s.sol`.
pub fn script_file_name(action: CutAction) -> &'static str {
    match action {
        CutAction::Add => "AddFacet.s.sol",
        CutAction::Replace => "ReplaceFacet.s.sol",
        CutAction::Remove => "RemoveFacet.s.sol",
    }
}

fn contract_name(action: CutAction) -> &'static str {
    match action {
        CutAction::Add => "AddFacetScript",
        CutAction::Replace => "ReplaceFacetScript",
        CutAction::Remove => "RemoveFacetScript",
    }
}

fn heading(action: CutAction) -> &'static str {
    match action {
        CutAction::Add => "Adding Functions to Diamond",
        CutAction::Replace => "Replacing Functions in Diamond",
        CutAction::Remove => "Removing Functions from Diamond",
    }
}

fn verb(action: CutAction) -> (&'static str, &'static str) {
    match action {
        CutAction::Add => ("add", "added"),
        CutAction::Replace => ("replace", "replaced"),
        CutAction::Remove => ("remove", "removed"),
    }
}

/// Render the script for one non-empty cut.
pub fn render_script(facet: &str, cut: &PlannedCut, network: &str) -> String {
    let (infinitive, past) = verb(cut.action);
    let contract = contract_name(cut.action);
    let file = script_file_name(cut.action);
    let count = cut.len();

    // Doc header: signatures where known, bare selectors otherwise (Remove).
    let function_list = if cut.functions.iter().any(|f| f.signature.is_some()) {
        cut.functions
            .iter()
            .map(|f| match &f.signature {
                Some(sig) => format!(" * - {sig}"),
                None => format!(" * - {}", f.selector),
            })
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        let sels: Vec<String> = cut.selectors().iter().map(|s| s.to_string()).collect();
        format!(" * Selectors: {}", sels.join(", "))
    };

    let selectors_array = cut
        .functions
        .iter()
        .enumerate()
        .map(|(i, f)| format!("selectors[{i}] = {};", f.selector))
        .collect::<Vec<_>>()
        .join("\n        ");

    let facet_import = match cut.action {
        CutAction::Remove => String::new(),
        _ => format!("import \"../contracts/facets/{facet}.sol\";\n"),
    };

    let deploy_block = match cut.action {
        CutAction::Remove => String::new(),
        _ => format!(
            r#"        // Deploy the new facet
        {facet} newFacet = new {facet}();
        console.log("New {facet} deployed to:", address(newFacet));

"#
        ),
    };

    let facet_address_expr = match cut.action {
        CutAction::Remove => "address(0), // Must be zero for Remove",
        _ => "address(newFacet),",
    };

    format!(
        r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import "forge-std/Script.sol";
import "../contracts/Diamond.sol";
import "../contracts/facets/DiamondCutFacet.sol";
{facet_import}
/**
 * @title {contract}
 * @dev Auto-generated script to {infinitive} functions for {facet}
 *
 * Functions to {infinitive}: {count}
{function_list}
 *
 * Usage:
 *   DIAMOND_ADDRESS=0x... forge script script/{file}:{contract} --rpc-url {network} --broadcast
 */
contract {contract} is Script {{
    function run() external {{
        address diamondAddress = vm.envAddress("DIAMOND_ADDRESS");
        require(diamondAddress != address(0), "DIAMOND_ADDRESS not set");

        uint256 deployerPrivateKey = vm.envUint("PRIVATE_KEY");

        console.log("Diamond Address:", diamondAddress);
        console.log("{heading}: {facet}");

        vm.startBroadcast(deployerPrivateKey);

{deploy_block}        // Selectors to {infinitive}
        bytes4[] memory selectors = new bytes4[]({count});
        {selectors_array}

        IDiamondCut.FacetCut[] memory cuts = new IDiamondCut.FacetCut[](1);
        cuts[0] = IDiamondCut.FacetCut({{
            facetAddress: {facet_address_expr}
            action: IDiamondCut.FacetCutAction.{action},
            functionSelectors: selectors
        }});

        DiamondCutFacet(diamondAddress).diamondCut(cuts, address(0), "");

        vm.stopBroadcast();

        console.log("Successfully {past}", selectors.length, "functions");
    }}
}}
"#,
        heading = heading(cut.action),
        action = cut.action,
    )
}

/// Write one script per non-empty action into the project's script
/// directory, returning the written paths.
pub fn write_scripts(
    layout: &ProjectLayout,
    facet: &str,
    plan: &CutPlan,
    network: &str,
) -> io::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for cut in plan.in_execution_order() {
        if cut.is_empty() {
            continue;
        }
        fs::create_dir_all(&layout.scripts_dir)?;
        let path = layout.scripts_dir.join(script_file_name(cut.action));
        fs::write(&path, render_script(facet, cut, network))?;
        debug!(path = %path.display(), "generated upgrade script");
        written.push(path);
    }
    Ok(written)
}
