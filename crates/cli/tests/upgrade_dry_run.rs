use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use facet_core::selector::selector;
use tempfile::tempdir;

const DIAMOND: &str = "0x00000000000000000000000000000000000000d1";
const FACET_A: &str = "0x00000000000000000000000000000000000000a1";

fn abi_function(name: &str, inputs: &[&str]) -> serde_json::Value {
    let inputs: Vec<serde_json::Value> =
        inputs.iter().map(|t| serde_json::json!({ "type": t })).collect();
    serde_json::json!({
        "type": "function",
        "name": name,
        "inputs": inputs,
        "outputs": [],
        "stateMutability": "nonpayable",
    })
}

fn write_artifact(root: &Path, facet: &str, functions: &[serde_json::Value]) {
    let dir = root.join("out").join(format!("{facet}.sol"));
    fs::create_dir_all(&dir).unwrap();
    let body = serde_json::json!({ "abi": functions });
    fs::write(dir.join(format!("{facet}.json")), serde_json::to_string_pretty(&body).unwrap())
        .unwrap();
}

fn sel(signature: &str) -> String {
    selector(signature).to_string()
}

fn write_snapshot(root: &Path, facets: &[(&str, Vec<String>)]) -> PathBuf {
    let facets: Vec<serde_json::Value> = facets
        .iter()
        .map(|(address, selectors)| {
            serde_json::json!({ "address": address, "selectors": selectors })
        })
        .collect();
    let path = root.join("diamond.json");
    let body = serde_json::json!({ "facets": facets });
    fs::write(&path, serde_json::to_string_pretty(&body).unwrap()).unwrap();
    path
}

fn read_report(root: &Path) -> serde_json::Value {
    let body = fs::read_to_string(root.join("upgrade-report.json")).expect("upgrade report");
    serde_json::from_str(&body).expect("upgrade report json")
}

#[test]
fn dry_run_prints_the_plan_and_writes_artifacts() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_artifact(
        root,
        "TokenFacet",
        &[
            abi_function("transfer", &["address", "uint256"]),
            abi_function("totalSupply", &[]),
            abi_function("balanceOf", &["address"]),
        ],
    );
    let registry = vec![sel("balanceOf(address)"), sel("approve(address,uint256)")];
    let snapshot = write_snapshot(root, &[(FACET_A, registry)]);

    let output = cargo_bin_cmd!("diamond-sync")
        .arg("upgrade")
        .arg("--root")
        .arg(root)
        .arg("--facet")
        .arg("TokenFacet")
        .arg("--diamond")
        .arg(DIAMOND)
        .arg("--skip-build")
        .env("DIAMOND_SYNC_FAKE_DIAMOND", &snapshot)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();

    assert!(text.contains("Add (2):"), "stdout:\n{text}");
    assert!(text.contains("Replace (1):"), "stdout:\n{text}");
    assert!(text.contains("Remove (1):"), "stdout:\n{text}");
    let owner_line =
        format!("{}  balanceOf(address)  (currently {FACET_A})", sel("balanceOf(address)"));
    assert!(text.contains(&owner_line), "stdout:\n{text}");
    assert!(text.contains("Dry run only"), "stdout:\n{text}");

    for script in ["AddFacet.s.sol", "ReplaceFacet.s.sol", "RemoveFacet.s.sol"] {
        assert!(root.join("script").join(script).exists(), "missing {script}");
    }

    let report = read_report(root);
    assert_eq!(report["facet"], "TokenFacet");
    assert_eq!(report["diamond"], DIAMOND);
    assert_eq!(report["mode"], "Atomic");
    assert_eq!(report["plan"]["add"]["functions"].as_array().unwrap().len(), 2);
    assert_eq!(report["plan"]["replace"]["functions"].as_array().unwrap().len(), 1);
    assert_eq!(report["plan"]["remove"]["functions"].as_array().unwrap().len(), 1);
    let removed = &report["plan"]["remove"]["functions"][0];
    assert_eq!(removed["selector"], sel("approve(address,uint256)"));
    assert!(removed["signature"].is_null());
    assert!(report["execution"].is_null());
}

#[test]
fn empty_interface_and_empty_diamond_is_a_noop() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_artifact(root, "EmptyFacet", &[]);
    let snapshot = write_snapshot(root, &[]);

    cargo_bin_cmd!("diamond-sync")
        .arg("upgrade")
        .arg("--root")
        .arg(root)
        .arg("--facet")
        .arg("EmptyFacet")
        .arg("--diamond")
        .arg(DIAMOND)
        .arg("--skip-build")
        .env("DIAMOND_SYNC_FAKE_DIAMOND", &snapshot)
        .assert()
        .success()
        .stdout(predicates::str::contains("Diamond is already in sync."));

    assert!(!root.join("script").join("AddFacet.s.sol").exists());
    let report = read_report(root);
    assert!(report["plan"]["add"]["functions"].as_array().unwrap().is_empty());
    assert!(report["execution"].is_null());
}

#[test]
fn json_flag_emits_the_report_on_stdout() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_artifact(root, "TokenFacet", &[abi_function("transfer", &["address", "uint256"])]);
    let snapshot = write_snapshot(root, &[]);

    let output = cargo_bin_cmd!("diamond-sync")
        .arg("upgrade")
        .arg("--root")
        .arg(root)
        .arg("--facet")
        .arg("TokenFacet")
        .arg("--diamond")
        .arg(DIAMOND)
        .arg("--skip-build")
        .arg("--json")
        .env("DIAMOND_SYNC_FAKE_DIAMOND", &snapshot)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).expect("report on stdout");
    assert_eq!(report["plan"]["add"]["functions"][0]["selector"], "0xa9059cbb");
    assert_eq!(report["plan"]["add"]["functions"][0]["signature"], "transfer(address,uint256)");
}

#[test]
fn diamond_address_resolution_prefers_flag_then_env_then_file() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_artifact(root, "TokenFacet", &[abi_function("transfer", &["address", "uint256"])]);
    let snapshot = write_snapshot(root, &[]);
    let file_diamond = "0x00000000000000000000000000000000000000f1";
    let env_diamond = "0x00000000000000000000000000000000000000e2";
    let flag_diamond = "0x00000000000000000000000000000000000000a3";
    fs::write(root.join(".env"), format!("DIAMOND_ADDRESS={file_diamond}\n")).unwrap();

    cargo_bin_cmd!("diamond-sync")
        .arg("upgrade")
        .arg("--root")
        .arg(root)
        .arg("--facet")
        .arg("TokenFacet")
        .arg("--skip-build")
        .env("DIAMOND_SYNC_FAKE_DIAMOND", &snapshot)
        .env_remove("DIAMOND_ADDRESS")
        .assert()
        .success();
    assert_eq!(read_report(root)["diamond"], file_diamond);

    cargo_bin_cmd!("diamond-sync")
        .arg("upgrade")
        .arg("--root")
        .arg(root)
        .arg("--facet")
        .arg("TokenFacet")
        .arg("--skip-build")
        .env("DIAMOND_SYNC_FAKE_DIAMOND", &snapshot)
        .env("DIAMOND_ADDRESS", env_diamond)
        .assert()
        .success();
    assert_eq!(read_report(root)["diamond"], env_diamond);

    cargo_bin_cmd!("diamond-sync")
        .arg("upgrade")
        .arg("--root")
        .arg(root)
        .arg("--facet")
        .arg("TokenFacet")
        .arg("--diamond")
        .arg(flag_diamond)
        .arg("--skip-build")
        .env("DIAMOND_SYNC_FAKE_DIAMOND", &snapshot)
        .env("DIAMOND_ADDRESS", env_diamond)
        .assert()
        .success();
    assert_eq!(read_report(root)["diamond"], flag_diamond);
}

#[test]
fn upgrade_without_any_diamond_address_fails_with_guidance() {
    let temp = tempdir().unwrap();

    cargo_bin_cmd!("diamond-sync")
        .arg("upgrade")
        .arg("--root")
        .arg(temp.path())
        .arg("--facet")
        .arg("TokenFacet")
        .arg("--skip-build")
        .env_remove("DIAMOND_ADDRESS")
        .assert()
        .failure()
        .stderr(predicates::str::contains("No diamond address configured"));
}
