use std::fs;

use facet_core::abi::FunctionRecord;
use facet_core::config::ProjectLayout;
use facet_core::reconcile::reconcile;
use facet_core::scripts::write_scripts;
use facet_core::selector::{selector, Selector, SelectorSet};

fn record(signature: &str) -> FunctionRecord {
    let name = signature.split('(').next().unwrap().to_string();
    FunctionRecord { name, signature: signature.to_string(), selector: selector(signature) }
}

#[test]
fn writes_one_script_per_non_empty_action() {
    let temp = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(temp.path());

    // Add increment(), Replace count(), Remove 0xdeadbeef.
    let records = vec![record("increment()"), record("count()")];
    let registry: SelectorSet =
        [selector("count()"), Selector::from(0xdeadbeef)].into_iter().collect();
    let plan = reconcile(&records, &registry);

    let written = write_scripts(&layout, "CounterFacet", &plan, "sepolia").unwrap();
    assert_eq!(written.len(), 3);
    assert!(layout.scripts_dir.join("AddFacet.s.sol").is_file());
    assert!(layout.scripts_dir.join("ReplaceFacet.s.sol").is_file());
    assert!(layout.scripts_dir.join("RemoveFacet.s.sol").is_file());
}

#[test]
fn add_script_deploys_the_facet_and_freezes_selectors() {
    let temp = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(temp.path());
    let plan = reconcile(&[record("increment()")], &SelectorSet::new());

    write_scripts(&layout, "CounterFacet", &plan, "sepolia").unwrap();
    let body = fs::read_to_string(layout.scripts_dir.join("AddFacet.s.sol")).unwrap();

    assert!(body.contains("contract AddFacetScript is Script"));
    assert!(body.contains("CounterFacet newFacet = new CounterFacet();"));
    assert!(body.contains("bytes4[] memory selectors = new bytes4[](1);"));
    assert!(body.contains(&format!("selectors[0] = {};", selector("increment()"))));
    assert!(body.contains("IDiamondCut.FacetCutAction.Add"));
    assert!(body.contains("* - increment()"));
    assert!(body.contains("--rpc-url sepolia --broadcast"));
    assert!(body.contains(r#"diamondCut(cuts, address(0), "")"#));
}

#[test]
fn remove_script_uses_the_zero_address_and_no_deploy() {
    let temp = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(temp.path());
    let registry: SelectorSet = [Selector::from(0xdeadbeef)].into_iter().collect();
    let plan = reconcile(&[], &registry);

    write_scripts(&layout, "CounterFacet", &plan, "localhost").unwrap();
    let body = fs::read_to_string(layout.scripts_dir.join("RemoveFacet.s.sol")).unwrap();

    assert!(body.contains("contract RemoveFacetScript is Script"));
    assert!(body.contains("facetAddress: address(0)"));
    assert!(body.contains("IDiamondCut.FacetCutAction.Remove"));
    assert!(body.contains("* Selectors: 0xdeadbeef"));
    assert!(!body.contains("new CounterFacet()"));
    // Remove scripts have no facet source to import.
    assert!(!body.contains("contracts/facets/CounterFacet.sol"));
}

#[test]
fn noop_plan_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(temp.path());
    let plan = reconcile(&[], &SelectorSet::new());

    let written = write_scripts(&layout, "CounterFacet", &plan, "sepolia").unwrap();
    assert!(written.is_empty());
    assert!(!layout.scripts_dir.exists());
}
