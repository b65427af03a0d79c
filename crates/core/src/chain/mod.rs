//! Chain access boundary.
//!
//! Everything that touches an RPC endpoint goes through the [`ChainBackend`]
//! trait: the loupe reader issues `call`s, the cut executor issues `send`s.
//! The production implementation shells out to Foundry's `cast`
//! ([`CastBackend`]); [`FixtureBackend`] replays a recorded diamond snapshot
//! so tests and offline dry-runs never need an endpoint.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod cast;
mod fixture;

pub use cast::CastBackend;
pub use fixture::{FixtureBackend, FixtureFacet};

/// A 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address; the loupe reports this for unclaimed selectors and
    /// Remove cuts must carry it as their facet.
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Parse from hex with an optional `0x` prefix; case-insensitive.
    pub fn parse(s: &str) -> Result<Self, ParseAddressError> {
        let hex = s.strip_prefix("0x").unwrap_or(s);
        if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseAddressError(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| ParseAddressError(s.to_string()))?;
            bytes[i] =
                u8::from_str_radix(pair, 16).map_err(|_| ParseAddressError(s.to_string()))?;
        }
        Ok(Address(bytes))
    }
}

/// Error for address strings that are not 20 bytes of hex.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid address '{0}': expected 20 bytes of hex (e.g. 0x5962...)")]
pub struct ParseAddressError(pub String);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AddressVisitor;

        impl Visitor<'_> for AddressVisitor {
            type Value = Address;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 20-byte hex address string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Address, E> {
                Address::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(AddressVisitor)
    }
}

/// Error type for chain backend operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The backend tool could not be spawned at all.
    #[error("Failed to spawn {tool}: {detail}")]
    Spawn { tool: String, detail: String },

    /// The backend tool ran but exited non-zero; `stderr` is surfaced
    /// verbatim so RPC errors reach the operator unmangled.
    #[error("{tool} exited with {status}: {stderr}")]
    Command { tool: String, status: String, stderr: String },

    /// The query succeeded but the response did not have the expected shape.
    #[error("Unexpected chain response: {0}")]
    Response(String),

    /// A state-changing submission was attempted without a configured signer.
    #[error("No private key configured; set PRIVATE_KEY or pass --private-key")]
    MissingKey,
}

/// Read/write access to a single RPC endpoint.
///
/// `call` is a read (eth_call semantics), `send` is a state-changing
/// transaction submission. Both take a human-readable function signature plus
/// textual arguments and return the tool's decoded textual output; callers
/// parse what they need from it.
pub trait ChainBackend: Send + Sync {
    fn call(&self, to: &Address, sig: &str, args: &[String]) -> Result<String, ChainError>;
    fn send(&self, to: &Address, sig: &str, args: &[String]) -> Result<String, ChainError>;
    fn name(&self) -> &'static str;
}
