use facet_core::selector::{selector, Selector};
use facet_core::version;

#[test]
fn version_is_non_empty() {
    let v = version();
    assert!(!v.is_empty());
}

#[test]
fn derives_well_known_erc20_selectors() {
    // Reference values from the ERC-20 interface.
    assert_eq!(selector("transfer(address,uint256)").to_string(), "0xa9059cbb");
    assert_eq!(selector("balanceOf(address)").to_string(), "0x70a08231");
    assert_eq!(selector("totalSupply()").to_string(), "0x18160ddd");
    assert_eq!(selector("approve(address,uint256)").to_string(), "0x095ea7b3");
    assert_eq!(selector("transferFrom(address,address,uint256)").to_string(), "0x23b872dd");
    assert_eq!(selector("allowance(address,address)").to_string(), "0xdd62ed3e");
}

#[test]
fn derives_loupe_and_cut_selectors() {
    // The diamond's own interface; these are fixed by EIP-2535.
    assert_eq!(selector("facetAddresses()").to_string(), "0x52ef6b2c");
    assert_eq!(selector("facetFunctionSelectors(address)").to_string(), "0xadfca15e");
    assert_eq!(selector("facetAddress(bytes4)").to_string(), "0xcdffacc6");
    assert_eq!(selector("facets()").to_string(), "0x7a0ed627");
    assert_eq!(
        selector("diamondCut((address,uint8,bytes4[])[],address,bytes)").to_string(),
        "0x1f931c1c"
    );
}

#[test]
fn derivation_is_deterministic_across_calls() {
    let first = selector("supportsInterface(bytes4)");
    for _ in 0..10 {
        assert_eq!(selector("supportsInterface(bytes4)"), first);
    }
    assert_eq!(first.to_string(), "0x01ffc9a7");
}

#[test]
fn parse_round_trips_display() {
    let sel = selector("owner()");
    assert_eq!(sel.to_string(), "0x8da5cb5b");
    assert_eq!(Selector::parse("0x8da5cb5b").unwrap(), sel);
    assert_eq!(Selector::parse("8da5cb5b").unwrap(), sel);
    assert_eq!("0x8DA5CB5B".parse::<Selector>().unwrap(), sel);
}

#[test]
fn parse_rejects_wrong_lengths_and_non_hex() {
    assert!(Selector::parse("0x123").is_err());
    assert!(Selector::parse("0xa9059cbb00").is_err());
    assert!(Selector::parse("0xzzzzzzzz").is_err());
    assert!(Selector::parse("").is_err());
    let err = Selector::parse("0xoops").unwrap_err();
    assert!(err.to_string().contains("Invalid selector '0xoops'"));
}

#[test]
fn ordering_follows_byte_value() {
    let low = Selector::from(0x01ffc9a7);
    let high = Selector::from(0xa9059cbb);
    assert!(low < high);

    let mut set = facet_core::selector::SelectorSet::new();
    set.insert(high);
    set.insert(low);
    let ordered: Vec<String> = set.iter().map(|s| s.to_string()).collect();
    assert_eq!(ordered, vec!["0x01ffc9a7", "0xa9059cbb"]);
}

#[test]
fn serializes_as_hex_string() {
    let sel = selector("transfer(address,uint256)");
    assert_eq!(serde_json::to_string(&sel).unwrap(), "\"0xa9059cbb\"");
    let back: Selector = serde_json::from_str("\"0xa9059cbb\"").unwrap();
    assert_eq!(back, sel);
}
