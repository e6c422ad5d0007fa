/*!

This is the command line interface for building and applying the blockchain-node cluster
topology: the EKS control plane, its IAM roles, OIDC identity federation, and the cluster
add-ons, as one validated dependency graph.

!*/

mod apply;
mod kubeconfig;
mod plan;
mod stack;

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

/// Build, inspect, and apply the cluster provisioning topology.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Build the topology from a stack config file and print it without applying anything.
    Plan(plan::Plan),
    /// Build the topology and submit it to the provisioning engine.
    Apply(apply::Apply),
    /// Render a kubeconfig for a cluster from its reported endpoint and CA data.
    Kubeconfig(kubeconfig::Kubeconfig),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.log_level);
    if let Err(e) = run(args).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Command::Plan(plan) => plan.run().await,
        Command::Apply(apply) => apply.run().await,
        Command::Kubeconfig(kubeconfig) => kubeconfig.run(),
    }
}

/// Initialize the logger with the value passed by `--log-level` (or its default) when the
/// `RUST_LOG` environment variable is not present. If present, the `RUST_LOG` environment variable
/// overrides `--log-level`/`level`.
fn init_logger(level: LevelFilter) {
    match std::env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            Builder::new()
                .filter(Some(env!("CARGO_CRATE_NAME")), level)
                .init();
        }
    }
}
