use crate::stack::Stack;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

/// Build the topology from a stack config file and print it without applying anything.
#[derive(Debug, Parser)]
pub(crate) struct Plan {
    /// Path to the stack configuration file.
    #[clap(long = "config", short = 'c')]
    config: PathBuf,

    /// Output the plan in JSON format.
    #[clap(long = "json")]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanOutput<'a> {
    creation_order: Vec<String>,
    nodes: &'a nodeplane_model::ResourceGraph,
}

impl Plan {
    pub(crate) async fn run(self) -> Result<()> {
        let stack = Stack::load(&self.config)?;
        let built = stack.bootstrap().await?;
        let order = built
            .graph()
            .creation_order()
            .context("Unable to order the topology")?;

        if self.json {
            let output = PlanOutput {
                creation_order: order.iter().map(ToString::to_string).collect(),
                nodes: built.graph(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&output).context("Unable to serialize the plan")?
            );
        } else {
            for name in &order {
                if let Some(node) = built.graph().get(name) {
                    let phase = built
                        .phase(name)
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:<45} {:<18} {}", name.to_string(), node.kind.to_string(), phase);
                }
            }
        }
        Ok(())
    }
}
