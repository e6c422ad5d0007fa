use crate::error::{self, Result};
use nodeplane_model::{Configuration, NodeKind, NodeName, ResourceGraph, ResourceNode};
use serde::{Deserialize, Serialize};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use snafu::{ensure, ResultExt};
use std::collections::BTreeSet;

/// How the engine resolves a conflict when an add-on is first installed and the runtime has
/// pre-installed a default version. This is independent of [`UpdateConflict`]: an add-on may need
/// to forcibly claim ownership at install time while still preserving operator customization on
/// later updates.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateConflict {
    None,
    Overwrite,
}

impl Default for CreateConflict {
    fn default() -> Self {
        Self::None
    }
}

derive_display_from_serialize!(CreateConflict);
derive_fromstr_from_deserialize!(CreateConflict);

/// How the engine resolves a conflict when an installed add-on is updated.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateConflict {
    Overwrite,
    Preserve,
}

impl Default for UpdateConflict {
    fn default() -> Self {
        Self::Preserve
    }
}

derive_display_from_serialize!(UpdateConflict);
derive_fromstr_from_deserialize!(UpdateConflict);

/// One add-on to attach to the cluster. All add-ons flow through the same [`attach`] routine;
/// behavioral differences live in this data, not in bespoke code paths.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddonSpec {
    pub name: String,
    pub create_conflict: CreateConflict,
    pub update_conflict: UpdateConflict,
    pub depends_on: BTreeSet<NodeName>,
    /// The federated role node whose ARN the add-on's service account assumes, if any.
    pub service_account_role: Option<NodeName>,
}

impl AddonSpec {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            create_conflict: CreateConflict::default(),
            update_conflict: UpdateConflict::default(),
            depends_on: BTreeSet::new(),
            service_account_role: None,
        }
    }

    pub fn create_conflict(mut self, conflict: CreateConflict) -> Self {
        self.create_conflict = conflict;
        self
    }

    pub fn update_conflict(mut self, conflict: UpdateConflict) -> Self {
        self.update_conflict = conflict;
        self
    }

    pub fn depends_on(mut self, node: &NodeName) -> Self {
        self.depends_on.insert(node.clone());
        self
    }

    pub fn service_account_role(mut self, role: NodeName) -> Self {
        self.service_account_role = Some(role);
        self
    }
}

/// The spec handed to the engine for an add-on node.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct AddonNodeSpec {
    addon_name: String,
    cluster_node: String,
    resolve_conflicts_on_create: CreateConflict,
    resolve_conflicts_on_update: UpdateConflict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    service_account_role_node: Option<String>,
}

impl Configuration for AddonNodeSpec {}

/// Declare an add-on node. Attaching an add-on whose dependency set does not include the cluster
/// node is a programming error surfaced here, at build time, not at apply time. If the spec
/// references a federated role, that role must already be declared and becomes a dependency, which
/// places the add-on transitively downstream of the OIDC provider.
pub fn attach(
    graph: &mut ResourceGraph,
    cluster: &NodeName,
    spec: AddonSpec,
) -> Result<NodeName> {
    ensure!(
        spec.depends_on.contains(cluster),
        error::AddonMissingClusterDependencySnafu {
            addon: spec.name.clone(),
            cluster: cluster.to_string(),
        }
    );
    if let Some(role) = &spec.service_account_role {
        ensure!(
            graph.contains(role),
            error::AddonRoleUndeclaredSnafu {
                addon: spec.name.clone(),
                role: role.to_string(),
            }
        );
    }

    let name = NodeName::new(&spec.name).context(error::GraphSnafu {
        what: spec.name.clone(),
    })?;

    let node_spec = AddonNodeSpec {
        addon_name: spec.name.clone(),
        cluster_node: cluster.to_string(),
        resolve_conflicts_on_create: spec.create_conflict,
        resolve_conflicts_on_update: spec.update_conflict,
        service_account_role_node: spec.service_account_role.as_ref().map(ToString::to_string),
    }
    .into_map()
    .context(error::GraphSnafu {
        what: spec.name.clone(),
    })?;

    let mut node = ResourceNode::new(name.clone(), NodeKind::Addon).with_spec(node_spec);
    for dependency in &spec.depends_on {
        node = node.depends_on(dependency);
    }
    if let Some(role) = &spec.service_account_role {
        node = node.depends_on(role);
    }

    graph.insert(node).context(error::GraphSnafu {
        what: spec.name.clone(),
    })?;
    Ok(name)
}

#[cfg(test)]
mod test {
    use super::{attach, AddonSpec, CreateConflict, UpdateConflict};
    use nodeplane_model::{NodeKind, NodeName, ResourceGraph, ResourceNode};

    fn cluster_graph() -> (ResourceGraph, NodeName) {
        let mut graph = ResourceGraph::new();
        let cluster = NodeName::new("eks-cluster").unwrap();
        graph
            .insert(ResourceNode::new(cluster.clone(), NodeKind::Cluster))
            .unwrap();
        (graph, cluster)
    }

    #[test]
    fn conflict_policies_render_like_the_api_values() {
        assert_eq!(CreateConflict::Overwrite.to_string(), "OVERWRITE");
        assert_eq!(CreateConflict::None.to_string(), "NONE");
        assert_eq!(UpdateConflict::Preserve.to_string(), "PRESERVE");
        assert_eq!(UpdateConflict::Overwrite.to_string(), "OVERWRITE");
    }

    #[test]
    fn conflict_axes_are_independent() {
        let spec = AddonSpec::new("vpc-cni")
            .create_conflict(CreateConflict::Overwrite)
            .update_conflict(UpdateConflict::Preserve);
        assert_eq!(spec.create_conflict, CreateConflict::Overwrite);
        assert_eq!(spec.update_conflict, UpdateConflict::Preserve);
    }

    #[test]
    fn attach_without_cluster_dependency_is_a_build_time_error() {
        let (mut graph, cluster) = cluster_graph();
        let result = attach(&mut graph, &cluster, AddonSpec::new("kube-proxy"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("kube-proxy"));
    }

    #[test]
    fn attach_records_conflict_policies_in_the_node_spec() {
        let (mut graph, cluster) = cluster_graph();
        let name = attach(
            &mut graph,
            &cluster,
            AddonSpec::new("vpc-cni")
                .create_conflict(CreateConflict::Overwrite)
                .depends_on(&cluster),
        )
        .unwrap();
        let node = graph.get(&name).unwrap();
        assert_eq!(node.spec["resolveConflictsOnCreate"], "OVERWRITE");
        assert_eq!(node.spec["resolveConflictsOnUpdate"], "PRESERVE");
    }

    #[test]
    fn attach_with_undeclared_role_fails() {
        let (mut graph, cluster) = cluster_graph();
        let role = NodeName::new("missing-role").unwrap();
        let result = attach(
            &mut graph,
            &cluster,
            AddonSpec::new("aws-ebs-csi-driver")
                .depends_on(&cluster)
                .service_account_role(role),
        );
        assert!(result.is_err());
    }

    #[test]
    fn attach_adds_role_to_dependency_set() {
        let (mut graph, cluster) = cluster_graph();
        let role = NodeName::new("csi-role").unwrap();
        graph
            .insert(ResourceNode::new(role.clone(), NodeKind::Role))
            .unwrap();
        let name = attach(
            &mut graph,
            &cluster,
            AddonSpec::new("aws-ebs-csi-driver")
                .depends_on(&cluster)
                .service_account_role(role.clone()),
        )
        .unwrap();
        assert!(graph.get(&name).unwrap().depends_on.contains(&role));
    }
}
