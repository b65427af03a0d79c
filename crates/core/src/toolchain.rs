//! Foundry build-tool boundary.
//!
//! Compilation and facet deployment go through `forge`. Neither operation has
//! algorithmic content here; this wrapper builds argument lists, runs the
//! tool, and surfaces its diagnostics verbatim on failure.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

use crate::chain::Address;

/// Error type for forge invocations.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("Failed to spawn {tool}: {detail}")]
    Spawn { tool: String, detail: String },

    /// The tool ran but exited non-zero; compiler/deploy diagnostics are
    /// passed through untouched.
    #[error("{tool} exited with {status}: {stderr}")]
    Failed { tool: String, status: String, stderr: String },

    /// `forge create` succeeded but its output carried no deployment address.
    #[error("Could not find a 'Deployed to:' address in forge create output")]
    MissingDeployAddress,
}

/// Wrapper around the `forge` executable, rooted at one project directory.
pub struct Forge {
    bin: PathBuf,
    project_root: PathBuf,
}

impl Forge {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self { bin: resolve_forge_path(), project_root: project_root.as_ref().to_path_buf() }
    }

    /// Override the `forge` executable path (mainly for tests).
    pub fn with_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.bin = bin.into();
        self
    }

    /// Compile the project (`forge build --force`).
    ///
    /// `--force` guarantees artifacts reflect the current sources; stale
    /// artifacts would silently reconcile against an old interface.
    pub fn build(&self) -> Result<(), ToolchainError> {
        self.run(&["build".to_string(), "--force".to_string()])?;
        Ok(())
    }

    /// Deploy one facet contract (`forge create`) and return its address.
    pub fn deploy_facet(
        &self,
        facet: &str,
        rpc_url: &str,
        private_key: &str,
    ) -> Result<Address, ToolchainError> {
        let target = format!("contracts/facets/{facet}.sol:{facet}");
        let output = self.run(&[
            "create".to_string(),
            target,
            "--rpc-url".to_string(),
            rpc_url.to_string(),
            "--private-key".to_string(),
            private_key.to_string(),
            "--broadcast".to_string(),
        ])?;
        parse_deployed_address(&output).ok_or(ToolchainError::MissingDeployAddress)
    }

    fn run(&self, args: &[String]) -> Result<String, ToolchainError> {
        debug!(tool = %self.bin.display(), args = args.join(" "), "running forge");
        let output =
            Command::new(&self.bin).args(args).current_dir(&self.project_root).output().map_err(
                |e| ToolchainError::Spawn { tool: display_tool(&self.bin), detail: e.to_string() },
            )?;
        if !output.status.success() {
            return Err(ToolchainError::Failed {
                tool: display_tool(&self.bin),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Pull the deployment address out of `forge create` output.
///
/// The line of interest looks like `Deployed to: 0x5FbDB2315678afecb367f032d93F642f64180aa3`.
pub fn parse_deployed_address(output: &str) -> Option<Address> {
    for line in output.lines() {
        if let Some(rest) = line.trim().strip_prefix("Deployed to:") {
            if let Ok(addr) = Address::parse(rest.trim()) {
                return Some(addr);
            }
        }
    }
    None
}

fn resolve_forge_path() -> PathBuf {
    std::env::var_os("FORGE_BIN").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("forge"))
}

fn display_tool(bin: &Path) -> String {
    bin.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "forge".to_string())
}
