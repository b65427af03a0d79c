use std::fs;

use facet_core::abi::{canonical_signature, load_records, AbiInput, ArtifactError};
use facet_core::selector::selector;

fn plain(kind: &str) -> AbiInput {
    AbiInput { kind: kind.to_string(), components: None }
}

#[test]
fn loads_function_records_in_declaration_order() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("CounterFacet.json");
    fs::write(
        &path,
        r#"{
  "abi": [
    {"type": "constructor", "inputs": []},
    {"type": "function", "name": "increment", "inputs": [], "outputs": [], "stateMutability": "nonpayable"},
    {"type": "event", "name": "Incremented", "inputs": [{"type": "uint256", "name": "by"}]},
    {"type": "function", "name": "setCount", "inputs": [{"type": "uint256", "name": "value"}], "outputs": []},
    {"type": "function", "name": "count", "inputs": [], "outputs": [{"type": "uint256"}]},
    {"type": "error", "name": "CountOverflow", "inputs": []}
  ],
  "bytecode": {"object": "0x6080"}
}"#,
    )
    .unwrap();

    let records = load_records(&path).unwrap();
    let signatures: Vec<&str> = records.iter().map(|r| r.signature.as_str()).collect();
    assert_eq!(signatures, vec!["increment()", "setCount(uint256)", "count()"]);
    assert_eq!(records[1].name, "setCount");
    assert_eq!(records[1].selector, selector("setCount(uint256)"));
}

#[test]
fn parameter_names_are_discarded_from_signatures() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("TokenFacet.json");
    fs::write(
        &path,
        r#"{"abi": [{"type": "function", "name": "transfer", "inputs": [
            {"type": "address", "name": "recipient"},
            {"type": "uint256", "name": "amount"}
        ]}]}"#,
    )
    .unwrap();

    let records = load_records(&path).unwrap();
    assert_eq!(records[0].signature, "transfer(address,uint256)");
    assert_eq!(records[0].selector.to_string(), "0xa9059cbb");
}

#[test]
fn tuple_parameters_expand_to_component_lists() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("CutFacet.json");
    fs::write(
        &path,
        r#"{"abi": [{"type": "function", "name": "diamondCut", "inputs": [
            {"type": "tuple[]", "name": "_diamondCut", "components": [
                {"type": "address", "name": "facetAddress"},
                {"type": "uint8", "name": "action"},
                {"type": "bytes4[]", "name": "functionSelectors"}
            ]},
            {"type": "address", "name": "_init"},
            {"type": "bytes", "name": "_calldata"}
        ]}]}"#,
    )
    .unwrap();

    let records = load_records(&path).unwrap();
    assert_eq!(records[0].signature, "diamondCut((address,uint8,bytes4[])[],address,bytes)");
    assert_eq!(records[0].selector.to_string(), "0x1f931c1c");
}

#[test]
fn nested_tuples_and_fixed_arrays_expand_recursively() {
    let inner = AbiInput {
        kind: "tuple".to_string(),
        components: Some(vec![plain("uint256"), plain("bool")]),
    };
    let outer = AbiInput {
        kind: "tuple[2]".to_string(),
        components: Some(vec![plain("address"), inner]),
    };
    let sig = canonical_signature("configure", &[outer, plain("bytes32")]);
    assert_eq!(sig, "configure((address,(uint256,bool))[2],bytes32)");
}

#[test]
fn missing_artifact_is_reported_with_its_path() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("GhostFacet.json");
    let err = load_records(&path).unwrap_err();
    assert!(matches!(err, ArtifactError::NotFound(_)));
    assert!(err.to_string().contains("GhostFacet.json"));
    assert!(err.to_string().contains("forge build"));
}

#[test]
fn malformed_artifact_is_a_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("BrokenFacet.json");
    fs::write(&path, "{ not json").unwrap();
    let err = load_records(&path).unwrap_err();
    assert!(matches!(err, ArtifactError::Parse { .. }));
    assert!(err.to_string().contains("BrokenFacet.json"));
}

#[test]
fn artifact_without_abi_key_yields_no_records() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("EmptyFacet.json");
    fs::write(&path, r#"{"bytecode": {"object": "0x"}}"#).unwrap();
    let records = load_records(&path).unwrap();
    assert!(records.is_empty());
}
