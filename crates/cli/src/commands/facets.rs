use anyhow::{Context, Result};
use serde::Serialize;

use facet_core::chain::Address;
use facet_core::config::ProjectLayout;
use facet_core::loupe::DiamondLoupe;
use facet_core::selector::Selector;

use crate::canonicalize_or_current;
use crate::commands::{resolve_backend, resolve_chain_config};

/// One row of the loupe listing.
#[derive(Debug, Serialize)]
pub struct FacetEntry {
    pub address: Address,
    pub selectors: Vec<Selector>,
}

/// Answer to a single-selector ownership query.
#[derive(Debug, Serialize)]
pub struct OwnerEntry {
    pub selector: Selector,
    pub facet: Option<Address>,
}

/// List the facets registered on a live diamond and the selectors each one
/// serves. With a selector argument, look up that one route instead.
pub fn facets_command(
    root: &str,
    network: &str,
    rpc_url: Option<&str>,
    diamond: Option<&str>,
    selector: Option<&str>,
    json: bool,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);
    let config = resolve_chain_config(&layout, network, rpc_url, diamond, None)?;
    let backend = resolve_backend(&config)?;
    let loupe = DiamondLoupe::new(config.diamond, backend.as_ref());

    if let Some(raw) = selector {
        return lookup_owner(&loupe, raw, json);
    }

    let addresses = loupe
        .facet_addresses()
        .with_context(|| format!("Failed to query the loupe of diamond {}", config.diamond))?;
    let mut entries = Vec::with_capacity(addresses.len());
    for address in addresses {
        let selectors = loupe
            .facet_selectors(&address)
            .with_context(|| format!("Failed to list selectors of facet {address}"))?;
        entries.push(FacetEntry { address, selectors: selectors.into_iter().collect() });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Facets on {} ({}):", config.diamond, entries.len());
    if entries.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for entry in &entries {
        println!("  {} ({} selectors)", entry.address, entry.selectors.len());
        for selector in &entry.selectors {
            println!("    {}", selector);
        }
    }

    Ok(())
}

/// One facetAddress query instead of the whole enumeration.
fn lookup_owner(loupe: &DiamondLoupe<'_>, raw: &str, json: bool) -> Result<()> {
    let selector = Selector::parse(raw)?;
    let facet = loupe
        .facet_of(selector)
        .with_context(|| format!("Failed to look up selector {selector} on {}", loupe.diamond()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&OwnerEntry { selector, facet })?);
        return Ok(());
    }

    match facet {
        Some(address) => println!("Selector {} is served by {}", selector, address),
        None => println!("Selector {} is not registered on {}", selector, loupe.diamond()),
    }
    Ok(())
}
