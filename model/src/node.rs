use crate::error::{self, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// The kinds of infrastructure a node can represent. The engine maps each kind to one cloud or
/// Kubernetes object type; this model only cares about the kind for validation and reporting.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Role,
    PolicyAttachment,
    OidcProvider,
    ServiceAccount,
    Cluster,
    Addon,
    NodeGroup,
    ConfigPayload,
    DnsRecord,
}

derive_display_from_serialize!(NodeKind);
derive_fromstr_from_deserialize!(NodeKind, |e| -> crate::Error {
    crate::error::OpaqueError::SerdePlain { source: e }.into()
});

/// The stable name of a resource node. Names are the reconciliation key across runs, so they are
/// restricted to lowercase alphanumerics and dashes and may not be empty.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Hash)]
#[serde(transparent)]
pub struct NodeName(String);

impl NodeName {
    pub fn new<S: Into<String>>(name: S) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(error::InvalidNodeNameSnafu {
                name,
                reason: "node names may not be empty".to_string(),
            }
            .build()
            .into());
        }
        if name.len() > 128 {
            return Err(error::InvalidNodeNameSnafu {
                name,
                reason: "node names may not exceed 128 characters".to_string(),
            }
            .build()
            .into());
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(error::InvalidNodeNameSnafu {
                name: name.clone(),
                reason: format!("invalid character '{}'", c),
            }
            .build()
            .into());
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A named unit of infrastructure declared for one provisioning run. The `spec` is open content
/// describing the node to the engine (a trust policy document, an add-on spec, an opaque file
/// payload); this model treats it as a pass-through map.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    pub name: NodeName,
    pub kind: NodeKind,
    /// Names of nodes that must exist and be stable before this one is created.
    pub depends_on: BTreeSet<NodeName>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub spec: Map<String, Value>,
}

impl ResourceNode {
    pub fn new(name: NodeName, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            depends_on: BTreeSet::new(),
            spec: Map::new(),
        }
    }

    /// Add a dependency edge from `dependency` to this node.
    pub fn depends_on(mut self, dependency: &NodeName) -> Self {
        self.depends_on.insert(dependency.clone());
        self
    }

    pub fn with_spec(mut self, spec: Map<String, Value>) -> Self {
        self.spec = spec;
        self
    }
}

#[cfg(test)]
mod test {
    use super::NodeName;

    #[test]
    fn node_name_accepts_dashed_lowercase() {
        assert!(NodeName::new("eks-cluster-role").is_ok());
    }

    #[test]
    fn node_name_rejects_empty() {
        assert!(NodeName::new("").is_err());
    }

    #[test]
    fn node_name_rejects_uppercase() {
        assert!(NodeName::new("eksCluster").is_err());
    }

    #[test]
    fn node_name_rejects_whitespace() {
        assert!(NodeName::new("eks cluster").is_err());
    }
}
