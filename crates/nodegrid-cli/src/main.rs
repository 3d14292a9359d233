//! nodegrid — inspect and scale a cluster's node-group stacks.
//!
//! # Usage
//!
//! ```text
//! nodegrid get nodegroups --inventory stacks.json --cluster prod
//! nodegrid scale nodegroup --inventory stacks.json --cluster prod --name ng-1 --nodes 4
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "nodegrid",
    about = "nodegrid — node-group discovery and capacity reconciliation",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Give up on control-plane calls after this many seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show resources
    Get {
        #[command(subcommand)]
        resource: GetResource,
    },
    /// Change the capacity of a resource
    Scale {
        #[command(subcommand)]
        resource: ScaleResource,
    },
}

#[derive(Subcommand)]
enum GetResource {
    /// List a cluster's node groups
    Nodegroups {
        /// Stack inventory file (JSON)
        #[arg(short, long)]
        inventory: PathBuf,
        /// Cluster name (default: [cluster].name from --config)
        #[arg(short, long)]
        cluster: Option<String>,
        /// Only show this node group
        #[arg(short, long)]
        name: Option<String>,
        /// nodegrid.toml with cluster and discovery settings
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
enum ScaleResource {
    /// Scale a node group
    Nodegroup {
        /// Stack inventory file (JSON)
        #[arg(short, long)]
        inventory: PathBuf,
        /// Cluster name (default: [cluster].name from --config)
        #[arg(short, long)]
        cluster: Option<String>,
        /// Node group to scale
        #[arg(short, long)]
        name: String,
        /// Desired number of nodes
        #[arg(short = 'N', long)]
        nodes: Option<u32>,
        /// Minimum number of nodes
        #[arg(long = "nodes-min")]
        nodes_min: Option<u32>,
        /// Maximum number of nodes
        #[arg(long = "nodes-max")]
        nodes_max: Option<u32>,
        /// nodegrid.toml; its [[nodegroups]] entry is the base spec and
        /// the flags above override it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the new template without updating the inventory
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,nodegrid=debug"))?,
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Get { resource } => match resource {
            GetResource::Nodegroups {
                inventory,
                cluster,
                name,
                config,
                output,
            } => {
                let target = commands::Target::resolve(inventory, cluster, config.as_deref(), cli.timeout)?;
                commands::get::nodegroups(&target, name.as_deref(), output).await
            }
        },
        Commands::Scale { resource } => match resource {
            ScaleResource::Nodegroup {
                inventory,
                cluster,
                name,
                nodes,
                nodes_min,
                nodes_max,
                config,
                dry_run,
            } => {
                let target = commands::Target::resolve(inventory, cluster, config.as_deref(), cli.timeout)?;
                let request = commands::scale::ScaleRequest {
                    name,
                    nodes,
                    nodes_min,
                    nodes_max,
                };
                commands::scale::nodegroup(&target, request, dry_run).await
            }
        },
    }
}
