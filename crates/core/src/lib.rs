//! facet-core
//!
//! Core library for EIP-2535 diamond maintenance: selector derivation from
//! canonical signatures, facet interface loading from Foundry artifacts,
//! loupe introspection of a live diamond, three-way Add/Replace/Remove
//! reconciliation, project-wide selector conflict scanning, and diamond-cut
//! planning/execution.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends (CLI, CI hooks, etc.).

pub mod selector;
pub mod abi;
pub mod chain;
pub mod config;
pub mod toolchain;
pub mod loupe;
pub mod reconcile;
pub mod conflict;
pub mod cut;
pub mod scripts;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
