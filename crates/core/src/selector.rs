//! Function selectors: the 4-byte routing keys of a diamond.
//!
//! A selector is the first four bytes of the keccak-256 digest of a function's
//! canonical signature string (`name(type1,type2,...)`, no parameter names).
//! Every routing decision a diamond makes is keyed on these values, so
//! derivation must be deterministic across runs and processes.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// A 4-byte function selector.
///
/// Ordering and equality are over the raw byte value, which is what makes
/// sorted selector lists reproducible between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector(pub [u8; 4]);

/// Set of selectors with deterministic (ascending) iteration order.
pub type SelectorSet = BTreeSet<Selector>;

/// Derive the selector for a canonical signature string.
///
/// This is the standard Ethereum rule: `keccak256(signature)[0..4]`. It is a
/// pure, total function; the same signature always yields the same selector.
pub fn selector(signature: &str) -> Selector {
    let digest = Keccak256::digest(signature.as_bytes());
    Selector([digest[0], digest[1], digest[2], digest[3]])
}

/// Error for selector strings that are not 4 bytes of hex.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid selector '{0}': expected 4 bytes of hex (e.g. 0xa9059cbb)")]
pub struct ParseSelectorError(pub String);

impl Selector {
    /// The raw bytes, most significant first.
    pub fn bytes(&self) -> [u8; 4] {
        self.0
    }

    /// Parse from hex with an optional `0x` prefix.
    pub fn parse(s: &str) -> Result<Self, ParseSelectorError> {
        let hex = s.strip_prefix("0x").unwrap_or(s);
        if hex.len() != 8 {
            return Err(ParseSelectorError(s.to_string()));
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| ParseSelectorError(s.to_string()))?;
        Ok(Selector(value.to_be_bytes()))
    }
}

impl From<u32> for Selector {
    fn from(value: u32) -> Self {
        Selector(value.to_be_bytes())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", u32::from_be_bytes(self.0))
    }
}

impl FromStr for Selector {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SelectorVisitor;

        impl Visitor<'_> for SelectorVisitor {
            type Value = Selector;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 4-byte hex selector string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Selector, E> {
                Selector::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(SelectorVisitor)
    }
}
