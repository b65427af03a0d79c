//! Read-only diamond introspection ("loupe") queries.
//!
//! EIP-2535 exposes no global "all selectors" primitive, so the full dispatch
//! table is composed here: enumerate facet addresses, then union each facet's
//! selector set. All queries go through a [`ChainBackend`]; nothing here
//! mutates chain state.

use tracing::debug;

use crate::chain::{Address, ChainBackend, ChainError};
use crate::selector::{Selector, SelectorSet};

/// Loupe query signatures, in cast's human-readable form with return types.
const FACET_ADDRESSES_SIG: &str = "facetAddresses()(address[])";
const FACET_SELECTORS_SIG: &str = "facetFunctionSelectors(address)(bytes4[])";
const FACET_ADDRESS_SIG: &str = "facetAddress(bytes4)(address)";

/// Read access to one diamond's dispatch table.
pub struct DiamondLoupe<'a> {
    diamond: Address,
    backend: &'a dyn ChainBackend,
}

impl<'a> DiamondLoupe<'a> {
    pub fn new(diamond: Address, backend: &'a dyn ChainBackend) -> Self {
        Self { diamond, backend }
    }

    pub fn diamond(&self) -> &Address {
        &self.diamond
    }

    /// All facet addresses currently registered in the diamond.
    pub fn facet_addresses(&self) -> Result<Vec<Address>, ChainError> {
        let raw = self.backend.call(&self.diamond, FACET_ADDRESSES_SIG, &[])?;
        let facets = parse_address_list(&raw);
        debug!(diamond = %self.diamond, facets = facets.len(), "enumerated facets");
        Ok(facets)
    }

    /// The selector set registered to one facet. Empty if the diamond does
    /// not know the address.
    pub fn facet_selectors(&self, facet: &Address) -> Result<SelectorSet, ChainError> {
        let raw = self.backend.call(&self.diamond, FACET_SELECTORS_SIG, &[facet.to_string()])?;
        Ok(parse_selector_list(&raw))
    }

    /// The union of every registered facet's selectors.
    ///
    /// Empty set for a diamond with zero facets. Queries run sequentially;
    /// a failure on any facet fails the whole composition, since a partial
    /// dispatch table would misclassify Add versus Replace downstream.
    pub fn all_selectors(&self) -> Result<SelectorSet, ChainError> {
        let mut all = SelectorSet::new();
        for facet in self.facet_addresses()? {
            all.extend(self.facet_selectors(&facet)?);
        }
        debug!(diamond = %self.diamond, selectors = all.len(), "collected dispatch table");
        Ok(all)
    }

    /// Which facet currently owns a selector; `None` if unclaimed (the
    /// diamond reports the zero address for those).
    pub fn facet_of(&self, selector: Selector) -> Result<Option<Address>, ChainError> {
        let raw = self.backend.call(&self.diamond, FACET_ADDRESS_SIG, &[selector.to_string()])?;
        let addr = parse_single_address(&raw)
            .ok_or_else(|| ChainError::Response(format!("expected an address, got '{raw}'")))?;
        Ok(if addr.is_zero() { None } else { Some(addr) })
    }
}

/// Extract every address token from a cast-decoded list like
/// `[0xabc..., 0xdef...]`. Non-address tokens are skipped.
fn parse_address_list(raw: &str) -> Vec<Address> {
    tokens(raw).filter_map(|tok| Address::parse(tok).ok()).collect()
}

/// Extract every bytes4 token from a cast-decoded list like
/// `[0x12345678, 0x87654321]`.
fn parse_selector_list(raw: &str) -> SelectorSet {
    tokens(raw).filter(|tok| tok.len() == 10).filter_map(|tok| Selector::parse(tok).ok()).collect()
}

fn parse_single_address(raw: &str) -> Option<Address> {
    tokens(raw).find_map(|tok| Address::parse(tok).ok())
}

fn tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| matches!(c, '[' | ']' | ',') || c.is_whitespace())
        .map(str::trim)
        .filter(|tok| tok.starts_with("0x"))
}
