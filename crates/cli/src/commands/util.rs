use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use facet_core::chain::{CastBackend, ChainBackend, FixtureBackend};
use facet_core::config::{ChainConfig, EnvFile, ProjectLayout};

/// Environment variable naming a diamond snapshot JSON file. When set, every
/// command talks to the snapshot instead of an RPC endpoint.
pub const FAKE_DIAMOND_ENV: &str = "DIAMOND_SYNC_FAKE_DIAMOND";

/// Resolve the chain configuration for a project, layering explicit flags
/// over the process environment over the project's `.env` file.
pub fn resolve_chain_config(
    layout: &ProjectLayout,
    network: &str,
    rpc_override: Option<&str>,
    diamond_override: Option<&str>,
    key_override: Option<&str>,
) -> Result<ChainConfig> {
    let env_file = EnvFile::load(&layout.env_file_path);
    let config =
        ChainConfig::resolve(network, rpc_override, diamond_override, key_override, &env_file)
            .context("Failed to resolve chain configuration")?;
    Ok(config)
}

/// Pick the chain backend for a resolved config.
///
/// Tests and offline dry runs can point `DIAMOND_SYNC_FAKE_DIAMOND` at a
/// snapshot file to avoid needing a node; everything else goes through cast.
pub fn resolve_backend(config: &ChainConfig) -> Result<Box<dyn ChainBackend>> {
    if let Some(path) = std::env::var_os(FAKE_DIAMOND_ENV) {
        let path = Path::new(&path);
        let backend = FixtureBackend::from_path(path)
            .with_context(|| format!("Failed to load diamond snapshot at {}", path.display()))?;
        debug!(path = %path.display(), "answering chain queries from a snapshot");
        return Ok(Box::new(backend));
    }
    Ok(Box::new(CastBackend::new(config.rpc_url.clone(), config.private_key.clone())))
}
