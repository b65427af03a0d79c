use anyhow::Result;
use clap::{Parser, Subcommand};
use diamond_sync::commands::{
    check_conflicts_command, facets_command, selectors_command, upgrade_command, UpgradeOptions,
};
use tracing_subscriber::EnvFilter;

/// Diamond selector synchronization CLI.
///
/// This CLI is a thin wrapper around `facet-core` (exposed in code as `facet_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "diamond-sync",
    version,
    about = "Keeps an EIP-2535 diamond's dispatch table in sync with compiled facets",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan (and optionally execute) a diamond upgrade for one facet.
    ///
    /// This will:
    /// - Compile the project with `forge build` (unless `--skip-build`).
    /// - Derive the facet's selectors from its compiled artifact.
    /// - Read the diamond's live dispatch table through the loupe.
    /// - Print the Add/Replace/Remove plan, write forge scripts under
    ///   `script/`, and write `upgrade-report.json`.
    /// - With `--execute`, deploy the facet if needed and submit diamondCut.
    Upgrade {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Facet contract name (e.g. `OwnershipFacet`).
        #[arg(long)]
        facet: String,

        /// Target network: `localhost`, `sepolia`, `mainnet`, or a raw RPC URL.
        #[arg(long, default_value = "localhost")]
        network: String,

        /// Explicit RPC endpoint, overriding the network mapping.
        #[arg(long)]
        rpc_url: Option<String>,

        /// Diamond proxy address. Falls back to DIAMOND_ADDRESS from the
        /// environment or the project `.env`.
        #[arg(long, env = "DIAMOND_ADDRESS")]
        diamond: Option<String>,

        /// Submit the plan on chain instead of stopping after the dry run.
        #[arg(long, default_value_t = false)]
        execute: bool,

        /// One diamondCut call per action instead of a single batched call.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Reuse an already-deployed facet instead of running `forge create`.
        #[arg(long)]
        facet_address: Option<String>,

        /// Skip `forge build` and trust the existing artifacts.
        #[arg(long, default_value_t = false)]
        skip_build: bool,

        /// Signing key for deployment and diamondCut submission.
        #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,

        /// Emit the upgrade report as JSON on stdout.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Scan every compiled facet for selector collisions.
    ///
    /// Two facets claiming the same 4-byte selector cannot coexist behind one
    /// diamond. Exits non-zero when a collision is found, so this can gate CI.
    CheckConflicts {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the selector table of one compiled facet.
    Selectors {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Facet contract name (e.g. `OwnershipFacet`).
        #[arg(long)]
        facet: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the facets registered on a live diamond and their selectors.
    Facets {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Target network: `localhost`, `sepolia`, `mainnet`, or a raw RPC URL.
        #[arg(long, default_value = "localhost")]
        network: String,

        /// Explicit RPC endpoint, overriding the network mapping.
        #[arg(long)]
        rpc_url: Option<String>,

        /// Diamond proxy address. Falls back to DIAMOND_ADDRESS from the
        /// environment or the project `.env`.
        #[arg(long, env = "DIAMOND_ADDRESS")]
        diamond: Option<String>,

        /// Look up which facet serves this one selector (e.g. `0xa9059cbb`)
        /// instead of listing everything.
        #[arg(long)]
        selector: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Upgrade {
            root,
            facet,
            network,
            rpc_url,
            diamond,
            execute,
            sequential,
            facet_address,
            skip_build,
            private_key,
            json,
        } => {
            let opts = UpgradeOptions {
                network,
                rpc_url,
                diamond,
                private_key,
                facet_address,
                execute,
                sequential,
                skip_build,
                json,
            };
            upgrade_command(&root, &facet, &opts)?
        }
        Command::CheckConflicts { root, json } => check_conflicts_command(&root, json)?,
        Command::Selectors { root, facet, json } => selectors_command(&root, &facet, json)?,
        Command::Facets { root, network, rpc_url, diamond, selector, json } => facets_command(
            &root,
            &network,
            rpc_url.as_deref(),
            diamond.as_deref(),
            selector.as_deref(),
            json,
        )?,
    }

    Ok(())
}

/// Tracing goes to stderr so stdout stays reserved for command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
