use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::chain::{Address, ChainBackend, ChainError};

/// Chain backend that shells out to Foundry's `cast` for every query and
/// submission. `cast` handles ABI encoding and signing; this wrapper only
/// builds argument lists and surfaces failures.
pub struct CastBackend {
    bin: PathBuf,
    rpc_url: String,
    private_key: Option<String>,
}

impl CastBackend {
    /// Build a backend for the given endpoint. The signing key is optional;
    /// read-only use never needs one, `send` fails without one.
    pub fn new(rpc_url: impl Into<String>, private_key: Option<String>) -> Self {
        Self { bin: resolve_cast_path(), rpc_url: rpc_url.into(), private_key }
    }

    /// Override the `cast` executable path (mainly for tests).
    pub fn with_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.bin = bin.into();
        self
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn run(&self, args: &[String]) -> Result<String, ChainError> {
        let output = Command::new(&self.bin).args(args).output().map_err(|e| {
            ChainError::Spawn { tool: display_tool(&self.bin), detail: e.to_string() }
        })?;
        if !output.status.success() {
            return Err(ChainError::Command {
                tool: display_tool(&self.bin),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl ChainBackend for CastBackend {
    fn call(&self, to: &Address, sig: &str, args: &[String]) -> Result<String, ChainError> {
        debug!(to = %to, sig, "cast call");
        let mut cmd_args = vec!["call".to_string(), to.to_string(), sig.to_string()];
        cmd_args.extend(args.iter().cloned());
        cmd_args.push("--rpc-url".to_string());
        cmd_args.push(self.rpc_url.clone());
        self.run(&cmd_args)
    }

    fn send(&self, to: &Address, sig: &str, args: &[String]) -> Result<String, ChainError> {
        let key = self.private_key.as_ref().ok_or(ChainError::MissingKey)?;
        debug!(to = %to, sig, "cast send");
        let mut cmd_args = vec!["send".to_string(), to.to_string(), sig.to_string()];
        cmd_args.extend(args.iter().cloned());
        cmd_args.push("--rpc-url".to_string());
        cmd_args.push(self.rpc_url.clone());
        cmd_args.push("--private-key".to_string());
        cmd_args.push(key.clone());
        self.run(&cmd_args)
    }

    fn name(&self) -> &'static str {
        "cast"
    }
}

fn resolve_cast_path() -> PathBuf {
    std::env::var_os("CAST_BIN").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("cast"))
}

fn display_tool(bin: &Path) -> String {
    bin.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "cast".to_string())
}
