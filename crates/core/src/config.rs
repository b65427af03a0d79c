//! Project layout and chain configuration.
//!
//! Configuration is resolved once, up front, into plain structs; nothing else
//! in the crate reads environment variables during planning or execution.
//! Precedence for every value is: explicit argument, then process
//! environment, then the project's `.env` file, then a built-in default.
//! The `.env` file is parsed into a map and never written back into the
//! process environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::chain::{Address, ParseAddressError};

/// Default RPC endpoints per well-known network name.
const LOCALHOST_RPC: &str = "http://localhost:8545";
const SEPOLIA_FALLBACK_RPC: &str = "https://ethereum-sepolia.publicnode.com";
const MAINNET_FALLBACK_RPC: &str = "https://eth.llamarpc.com";

/// Error type for configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No diamond address could be found anywhere in the resolution chain.
    #[error("No diamond address configured; set DIAMOND_ADDRESS in .env or pass --diamond")]
    MissingDiamond,

    /// A diamond address was found but does not parse.
    #[error("Invalid diamond address: {0}")]
    InvalidDiamond(#[from] ParseAddressError),
}

/// Logical layout of a Foundry project on disk.
///
/// This is derived from a chosen root path. It does not perform any IO
/// itself; loaders and scanners take these paths and do their own reads.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Root directory of the project.
    pub root: PathBuf,
    /// Directory Foundry writes compiled artifacts to (out).
    pub artifacts_dir: PathBuf,
    /// Directory holding facet sources (contracts/facets).
    pub facets_dir: PathBuf,
    /// Directory generated upgrade scripts are written to (script).
    pub scripts_dir: PathBuf,
    /// Path to the project's `.env` file.
    pub env_file_path: PathBuf,
}

impl ProjectLayout {
    /// Compute the default layout for a project rooted at `root`.
    ///
    /// This does *not* touch the filesystem.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let artifacts_dir = root.join("out");
        let facets_dir = root.join("contracts").join("facets");
        let scripts_dir = root.join("script");
        let env_file_path = root.join(".env");

        Self { root, artifacts_dir, facets_dir, scripts_dir, env_file_path }
    }

    /// Path to the compiled artifact for a facet: `out/<Facet>.sol/<Facet>.json`.
    pub fn artifact_path(&self, facet: &str) -> PathBuf {
        self.artifacts_dir.join(format!("{facet}.sol")).join(format!("{facet}.json"))
    }
}

/// Key/value view of a `.env` file.
///
/// Lines are `KEY=VALUE`; blank lines and `#` comments are skipped, an
/// optional `export ` prefix is tolerated, and surrounding single or double
/// quotes on the value are stripped. Later assignments win.
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    vars: BTreeMap<String, String>,
}

impl EnvFile {
    /// An empty map, for callers that run without a project `.env`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse `.env` syntax from a string.
    pub fn parse(body: &str) -> Self {
        let mut vars = BTreeMap::new();
        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            vars.insert(key.to_string(), unquote(value.trim()).to_string());
        }
        Self { vars }
    }

    /// Load a `.env` file from disk. A missing or unreadable file yields an
    /// empty map; running without one is routine on fresh checkouts.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(body) => {
                let env = Self::parse(&body);
                debug!(path = %path.display(), keys = env.vars.len(), "loaded env file");
                env
            }
            Err(_) => Self::empty(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Strip one matching pair of surrounding quotes, if present.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Everything needed to talk to one diamond on one endpoint.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Network name as given (`localhost`, `sepolia`, `mainnet`, or a raw URL).
    pub network: String,
    /// Resolved RPC endpoint.
    pub rpc_url: String,
    /// The diamond proxy address.
    pub diamond: Address,
    /// Signing key for state-changing calls; reads work without one.
    pub private_key: Option<String>,
}

impl ChainConfig {
    /// Resolve a full chain configuration.
    ///
    /// `rpc_override`, `diamond_override`, and `key_override` are explicit
    /// values (CLI flags); they beat the process environment, which beats
    /// `env_file`, which beats built-in defaults. The diamond address is the
    /// only value with no default.
    pub fn resolve(
        network: &str,
        rpc_override: Option<&str>,
        diamond_override: Option<&str>,
        key_override: Option<&str>,
        env_file: &EnvFile,
    ) -> Result<Self, ConfigError> {
        let rpc_url = match rpc_override {
            Some(url) => url.to_string(),
            None => rpc_for_network(network, env_file),
        };

        let diamond_str = match diamond_override {
            Some(addr) => addr.to_string(),
            None => lookup("DIAMOND_ADDRESS", env_file).ok_or(ConfigError::MissingDiamond)?,
        };
        let diamond = Address::parse(&diamond_str)?;

        let private_key =
            key_override.map(str::to_string).or_else(|| lookup("PRIVATE_KEY", env_file));

        debug!(network, rpc_url, diamond = %diamond, "resolved chain config");
        Ok(Self { network: network.to_string(), rpc_url, diamond, private_key })
    }
}

/// Look up `key` in the process environment, then in the `.env` map.
///
/// Empty strings count as unset so a stray `PRIVATE_KEY=` line does not
/// shadow a real value further down the chain.
fn lookup(key: &str, env_file: &EnvFile) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| env_file.get(key).filter(|v| !v.is_empty()).map(str::to_string))
}

/// Map a network name to an RPC URL.
///
/// Unrecognized names are passed through unchanged so operators can hand a
/// raw endpoint URL straight to `--network`.
pub fn rpc_for_network(network: &str, env_file: &EnvFile) -> String {
    match network {
        "localhost" => LOCALHOST_RPC.to_string(),
        "sepolia" => lookup("SEPOLIA_RPC_URL", env_file)
            .unwrap_or_else(|| SEPOLIA_FALLBACK_RPC.to_string()),
        "mainnet" => {
            lookup("MAINNET_RPC_URL", env_file).unwrap_or_else(|| MAINNET_FALLBACK_RPC.to_string())
        }
        other => other.to_string(),
    }
}
