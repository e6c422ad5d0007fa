use crate::error::{self, Result};
use crate::node::{NodeName, ResourceNode};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use topological_sort::TopologicalSort;

/// The full set of resource nodes declared for one provisioning run, with the partial order
/// between them. The graph is the single source of truth for creation ordering: callers never
/// infer ordering from the sequence in which nodes were declared.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct ResourceGraph {
    nodes: BTreeMap<NodeName, ResourceNode>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node. Declaring two nodes with the same stable name in one run is a build-time
    /// error, never a merge.
    pub fn insert(&mut self, node: ResourceNode) -> Result<NodeName> {
        if self.nodes.contains_key(&node.name) {
            return Err(error::DuplicateNodeSnafu {
                name: node.name.to_string(),
            }
            .build()
            .into());
        }
        debug!("Declared node '{}' ({})", node.name, node.kind);
        let name = node.name.clone();
        self.nodes.insert(name.clone(), node);
        Ok(name)
    }

    pub fn get(&self, name: &NodeName) -> Option<&ResourceNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &NodeName) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.values()
    }

    /// Check that every declared dependency names a declared node and that the node set forms a
    /// DAG. This runs before anything is submitted to the engine.
    pub fn validate(&self) -> Result<()> {
        for node in self.nodes.values() {
            for dependency in &node.depends_on {
                if !self.nodes.contains_key(dependency) {
                    return Err(error::UnknownDependencySnafu {
                        name: node.name.to_string(),
                        dependency: dependency.to_string(),
                    }
                    .build()
                    .into());
                }
            }
        }
        self.creation_order().map(|_| ())
    }

    /// Return the node names in an order that satisfies every dependency edge. Nodes with no
    /// ordering relationship are returned in name order so the result is deterministic.
    pub fn creation_order(&self) -> Result<Vec<NodeName>> {
        let mut topo_sort = TopologicalSort::new();
        for node in self.nodes.values() {
            topo_sort.insert(node.name.clone());
            for dependency in &node.depends_on {
                topo_sort.add_dependency(dependency.clone(), node.name.clone());
            }
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        while !topo_sort.is_empty() {
            let mut layer = topo_sort.pop_all();
            if layer.is_empty() {
                // Nothing is free but nodes remain, so the remainder forms at least one cycle.
                let ordered: BTreeSet<NodeName> = order.iter().cloned().collect();
                let cycle: Vec<String> = self
                    .nodes
                    .keys()
                    .filter(|name| !ordered.contains(*name))
                    .map(|name| name.to_string())
                    .collect();
                return Err(error::DependencyCycleSnafu { nodes: cycle }.build().into());
            }
            layer.sort();
            order.extend(layer);
        }
        Ok(order)
    }

    /// Whether `from` transitively depends on `to`. Used by callers validating cross-domain
    /// ordering (for example, that a federated add-on sits downstream of the OIDC provider).
    pub fn transitively_depends_on(&self, from: &NodeName, to: &NodeName) -> bool {
        let mut visited = BTreeSet::new();
        let mut stack = vec![from.clone()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&current) {
                for dependency in &node.depends_on {
                    if dependency == to {
                        return true;
                    }
                    stack.push(dependency.clone());
                }
            }
        }
        false
    }
}
