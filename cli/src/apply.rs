use crate::stack::Stack;
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use log::info;
use nodeplane_bootstrap::CLUSTER_NODE;
use nodeplane_engine::{
    ExportMap, ProvisionResult, ProvisioningEngine, TopologyEmitter,
};
use nodeplane_model::{HandleValue, NodeName, ProducedHandles, ResourceNode};
use std::path::PathBuf;

/// Build the topology and submit it to the provisioning engine.
#[derive(Debug, Parser)]
pub(crate) struct Apply {
    /// Path to the stack configuration file.
    #[clap(long = "config", short = 'c')]
    config: PathBuf,

    /// Log each node instead of creating it. The only in-process engine; real engines implement
    /// the provisioning seam and are linked in by the deployment binary.
    #[clap(long = "dry-run")]
    dry_run: bool,
}

impl Apply {
    pub(crate) async fn run(self) -> Result<()> {
        anyhow::ensure!(
            self.dry_run,
            "no provisioning engine is linked into this binary; pass --dry-run to walk the \
             topology without creating anything"
        );

        let stack = Stack::load(&self.config)?;
        let built = stack.bootstrap().await?;
        let cluster = NodeName::new(CLUSTER_NODE).context("Invalid cluster node name")?;
        let exports = ExportMap::new()
            .publish("clusterName", &cluster, "name")
            .publish("clusterArn", &cluster, "arn");

        let emitter = TopologyEmitter::new(DryRunEngine);
        let emitted = emitter
            .submit(built.graph(), &exports)
            .await
            .context("Unable to apply the topology")?;

        for (name, value) in emitted.exports() {
            println!("{} = {}", name, value);
        }
        Ok(())
    }
}

/// Walks the graph in dependency order without touching any external system, synthesizing a
/// placeholder ARN and name handle per node.
struct DryRunEngine;

#[async_trait]
impl ProvisioningEngine for DryRunEngine {
    async fn create(&self, node: &ResourceNode) -> ProvisionResult<ProducedHandles> {
        info!("dry-run: would create '{}' ({})", node.name, node.kind);
        let mut handles = ProducedHandles::new();
        handles.insert(
            "arn",
            HandleValue::Ready(format!("arn:aws:dry-run:::{}", node.name)),
        );
        handles.insert("name", HandleValue::Ready(node.name.to_string()));
        Ok(handles)
    }
}
