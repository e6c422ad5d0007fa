use crate::error::{self, Result};
use crate::provision::ProvisioningEngine;
use log::info;
use nodeplane_model::{NodeName, ProducedHandles, ResourceGraph};
use snafu::ResultExt;
use std::collections::BTreeMap;

/// The stable export names a run publishes, each naming the node and handle the value comes from.
/// Downstream stacks (monitoring, node deployer) read exports by name and never reach into the
/// graph itself.
#[derive(Debug, Clone, Default)]
pub struct ExportMap {
    exports: BTreeMap<String, (NodeName, String)>,
}

impl ExportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `node`'s handle `handle` under the stable name `name`.
    pub fn publish<S1, S2>(mut self, name: S1, node: &NodeName, handle: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        self.exports
            .insert(name.into(), (node.clone(), handle.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &(NodeName, String))> {
        self.exports.iter()
    }
}

/// The result of one successful run: every produced handle, plus the resolved exports.
#[derive(Debug, Clone)]
pub struct EmittedTopology {
    handles: BTreeMap<NodeName, ProducedHandles>,
    exports: BTreeMap<String, String>,
}

impl EmittedTopology {
    pub fn handles(&self, node: &NodeName) -> Option<&ProducedHandles> {
        self.handles.get(node)
    }

    pub fn export(&self, name: &str) -> Option<&str> {
        self.exports.get(name).map(String::as_str)
    }

    pub fn exports(&self) -> impl Iterator<Item = (&String, &String)> {
        self.exports.iter()
    }
}

/// Submits a validated graph to the external provisioning engine, once, in an order that
/// satisfies every dependency edge. This layer performs no retries of its own: an engine failure
/// is reported verbatim with the failing node's name and the run terminates, leaving previously
/// created nodes as-is for the next idempotent run to reconcile.
pub struct TopologyEmitter<E> {
    engine: E,
}

impl<E: ProvisioningEngine> TopologyEmitter<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub async fn submit(
        &self,
        graph: &ResourceGraph,
        exports: &ExportMap,
    ) -> Result<EmittedTopology> {
        graph.validate().context(error::GraphSnafu)?;
        let order = graph.creation_order().context(error::GraphSnafu)?;
        info!("Submitting {} nodes to the engine", order.len());

        let mut handles = BTreeMap::new();
        for name in &order {
            // Validation guarantees every ordered name is declared.
            if let Some(node) = graph.get(name) {
                let produced =
                    self.engine
                        .create(node)
                        .await
                        .context(error::EngineSnafu {
                            node: name.to_string(),
                        })?;
                info!("Created node '{}'", name);
                handles.insert(name.clone(), produced);
            }
        }

        let mut resolved = BTreeMap::new();
        for (export_name, (node, handle)) in exports.iter() {
            let produced = handles.get(node).cloned().unwrap_or_default();
            let value = produced
                .require(node, handle)
                .context(error::ExportSnafu { name: export_name })?;
            resolved.insert(export_name.clone(), value.to_string());
        }

        Ok(EmittedTopology {
            handles,
            exports: resolved,
        })
    }
}
