use crate::addon::{attach, AddonSpec, CreateConflict, UpdateConflict};
use crate::error::{self, Result};
use log::info;
use nodeplane_identity::{
    attachment_node_name, service_trust_policy, FederationBinder, IdentityFact,
    ServiceAccountIdentity, ServicePrincipal, TrustPolicyDocument,
};
use nodeplane_model::{Configuration, NodeKind, NodeName, ResourceGraph, ResourceNode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use snafu::{ensure, ResultExt};
use std::collections::BTreeMap;

/// Stable node names for the bootstrap graph. Node names are the reconciliation key across runs,
/// so they never vary with configuration.
pub const CLUSTER_ROLE_NODE: &str = "eks-cluster-role";
pub const CLUSTER_NODE: &str = "eks-cluster";
pub const NODE_ROLE_NODE: &str = "eks-node-role";
pub const NODE_GROUP_NODE: &str = "eks-node-group";
pub const KUBE_PROXY_ADDON: &str = "kube-proxy";
pub const VPC_CNI_ADDON: &str = "vpc-cni";
pub const COREDNS_ADDON: &str = "coredns";
pub const STORAGE_ADDON: &str = "aws-ebs-csi-driver";

const EKS_CLUSTER_POLICY: &str = "AmazonEKSClusterPolicy";
const WORKER_NODE_POLICY: &str = "AmazonEKSWorkerNodePolicy";
const CNI_POLICY: &str = "AmazonEKS_CNI_Policy";
const REGISTRY_READ_POLICY: &str = "AmazonEC2ContainerRegistryReadOnly";
const EBS_CSI_POLICY: &str = "service-role/AmazonEBSCSIDriverPolicy";

const STORAGE_SERVICE_ACCOUNT_NAMESPACE: &str = "kube-system";
const STORAGE_SERVICE_ACCOUNT_NAME: &str = "ebs-csi-controller-sa";

/// The phases a bootstrap run moves through. Phases group nodes for reporting; the authoritative
/// ordering is always the graph's edges.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum BootstrapPhase {
    RoleReady,
    ClusterReady,
    AddonsPartial,
    NodeGroupReady,
    AddonsComplete,
}

derive_display_from_serialize!(BootstrapPhase);
derive_fromstr_from_deserialize!(BootstrapPhase);

/// Where the EBS CSI managed policy lands. The scoped federated service-account role is the
/// default; attaching to the node role grants every workload on every node the storage
/// permissions and must be opted into explicitly.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum EbsCsiPolicyTarget {
    FederatedRole,
    NodeRole,
}

impl Default for EbsCsiPolicyTarget {
    fn default() -> Self {
        Self::FederatedRole
    }
}

derive_display_from_serialize!(EbsCsiPolicyTarget);
derive_fromstr_from_deserialize!(EbsCsiPolicyTarget);

/// The managed node group's shape.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupSpec {
    pub instance_types: Vec<String>,
    pub desired_size: i32,
    pub min_size: i32,
    pub max_size: i32,
    pub disk_size_gib: i32,
    pub ami_type: String,
}

impl Default for NodeGroupSpec {
    fn default() -> Self {
        Self {
            instance_types: vec!["m7g.xlarge".to_string()],
            desired_size: 2,
            min_size: 2,
            max_size: 2,
            disk_size_gib: 20,
            ami_type: "AL2_ARM_64".to_string(),
        }
    }
}

/// The cluster-level inputs to a bootstrap run. `subnet_ids` come from the subnet discovery
/// collaborator and are passed through opaque.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    pub subnet_ids: Vec<String>,
    #[serde(default)]
    pub node_group: NodeGroupSpec,
    #[serde(default)]
    pub ebs_csi_policy_target: EbsCsiPolicyTarget,
}

impl ClusterSpec {
    pub fn new(subnet_ids: Vec<String>) -> Self {
        Self {
            subnet_ids,
            node_group: NodeGroupSpec::default(),
            ebs_csi_policy_target: EbsCsiPolicyTarget::default(),
        }
    }
}

/// The inputs required to register the cluster's OIDC provider.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FederationConfig {
    pub audiences: Vec<String>,
    pub thumbprints: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct ClusterNodeSpec {
    cluster_name: String,
    role_node: String,
    subnet_ids: Vec<String>,
}

impl Configuration for ClusterNodeSpec {}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct ScalingConfig {
    desired_size: i32,
    min_size: i32,
    max_size: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct NodeGroupNodeSpec {
    node_group_name: String,
    cluster_node: String,
    role_node: String,
    subnet_ids: Vec<String>,
    instance_types: Vec<String>,
    scaling_config: ScalingConfig,
    disk_size: i32,
    ami_type: String,
}

impl Configuration for NodeGroupNodeSpec {}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct PolicyAttachmentSpec {
    role_node: String,
    policy_arn: String,
}

impl Configuration for PolicyAttachmentSpec {}

/// The validated output of a bootstrap build: the graph plus the names of the nodes downstream
/// consumers care about, and the phase each node belongs to.
#[derive(Debug, Clone)]
pub struct BootstrapGraph {
    graph: ResourceGraph,
    phases: BTreeMap<NodeName, BootstrapPhase>,
    cluster: NodeName,
    cluster_role: NodeName,
    node_role: NodeName,
    node_group: NodeName,
    network_addons: Vec<NodeName>,
    oidc_provider: Option<NodeName>,
    storage_addon: Option<NodeName>,
}

impl BootstrapGraph {
    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn into_graph(self) -> ResourceGraph {
        self.graph
    }

    pub fn phase(&self, node: &NodeName) -> Option<BootstrapPhase> {
        self.phases.get(node).copied()
    }

    pub fn cluster(&self) -> &NodeName {
        &self.cluster
    }

    pub fn cluster_role(&self) -> &NodeName {
        &self.cluster_role
    }

    pub fn node_role(&self) -> &NodeName {
        &self.node_role
    }

    pub fn node_group(&self) -> &NodeName {
        &self.node_group
    }

    pub fn network_addons(&self) -> &[NodeName] {
        &self.network_addons
    }

    pub fn oidc_provider(&self) -> Option<&NodeName> {
        self.oidc_provider.as_ref()
    }

    pub fn storage_addon(&self) -> Option<&NodeName> {
        self.storage_addon.as_ref()
    }
}

/// Builds the bootstrap graph for one provisioning run.
#[derive(Debug, Clone)]
pub struct ClusterBootstrap {
    binder: FederationBinder,
    spec: ClusterSpec,
    federation: Option<FederationConfig>,
}

impl ClusterBootstrap {
    pub fn new(fact: IdentityFact, spec: ClusterSpec) -> Self {
        Self {
            binder: FederationBinder::new(fact),
            spec,
            federation: None,
        }
    }

    /// Configure OIDC federation. Without this, add-ons that require a federated role are
    /// skipped; they are never created with an empty trust reference.
    pub fn with_federation(mut self, federation: FederationConfig) -> Self {
        self.federation = Some(federation);
        self
    }

    pub fn build(self) -> Result<BootstrapGraph> {
        ensure!(!self.spec.subnet_ids.is_empty(), error::EmptySubnetSetSnafu);

        let fact = self.binder.fact().clone();
        let partition = fact.partition().to_string();
        let mut graph = ResourceGraph::new();
        let mut phases = BTreeMap::new();

        // RoleReady: the control-plane role and its policy attachment.
        let cluster_role = declare_service_role(
            &mut graph,
            CLUSTER_ROLE_NODE,
            ServicePrincipal::Eks,
        )?;
        let cluster_role_attachments = attach_managed_policies(
            &mut graph,
            &cluster_role,
            &partition,
            &[EKS_CLUSTER_POLICY],
        )?;
        phases.insert(cluster_role.clone(), BootstrapPhase::RoleReady);
        for attachment in &cluster_role_attachments {
            phases.insert(attachment.clone(), BootstrapPhase::RoleReady);
        }

        // ClusterReady: the control plane depends only on its role and the resolved subnets.
        let cluster = NodeName::new(CLUSTER_NODE).context(error::GraphSnafu {
            what: "cluster".to_string(),
        })?;
        let cluster_spec = ClusterNodeSpec {
            cluster_name: fact.cluster_name().to_string(),
            role_node: cluster_role.to_string(),
            subnet_ids: self.spec.subnet_ids.clone(),
        }
        .into_map()
        .context(error::GraphSnafu {
            what: "cluster".to_string(),
        })?;
        graph
            .insert(
                ResourceNode::new(cluster.clone(), NodeKind::Cluster)
                    .depends_on(&cluster_role)
                    .with_spec(cluster_spec),
            )
            .context(error::GraphSnafu {
                what: "cluster".to_string(),
            })?;
        phases.insert(cluster.clone(), BootstrapPhase::ClusterReady);

        // AddonsPartial: pod networking must be in place before any node registers.
        let kube_proxy = attach(
            &mut graph,
            &cluster,
            AddonSpec::new(KUBE_PROXY_ADDON).depends_on(&cluster),
        )?;
        let vpc_cni = attach(
            &mut graph,
            &cluster,
            AddonSpec::new(VPC_CNI_ADDON)
                .create_conflict(CreateConflict::Overwrite)
                .depends_on(&cluster),
        )?;
        phases.insert(kube_proxy.clone(), BootstrapPhase::AddonsPartial);
        phases.insert(vpc_cni.clone(), BootstrapPhase::AddonsPartial);

        // The node role chain. The node group must not be declared until every required policy
        // attachment on the node role is declared; nodes joining with inadequate permissions is
        // treated as a defect class, not a cloud-side concern.
        let node_role = declare_service_role(&mut graph, NODE_ROLE_NODE, ServicePrincipal::Ec2)?;
        let mut node_policies = vec![WORKER_NODE_POLICY, CNI_POLICY, REGISTRY_READ_POLICY];
        if self.spec.ebs_csi_policy_target == EbsCsiPolicyTarget::NodeRole {
            node_policies.push(EBS_CSI_POLICY);
        }
        let node_role_attachments =
            attach_managed_policies(&mut graph, &node_role, &partition, &node_policies)?;
        phases.insert(node_role.clone(), BootstrapPhase::NodeGroupReady);
        for attachment in &node_role_attachments {
            phases.insert(attachment.clone(), BootstrapPhase::NodeGroupReady);
        }

        // NodeGroupReady: the managed node group waits on the network add-ons and the complete
        // node role chain.
        let node_group = NodeName::new(NODE_GROUP_NODE).context(error::GraphSnafu {
            what: "node group".to_string(),
        })?;
        let node_group_spec = NodeGroupNodeSpec {
            node_group_name: format!("{}-nodegroup", fact.cluster_name()),
            cluster_node: cluster.to_string(),
            role_node: node_role.to_string(),
            subnet_ids: self.spec.subnet_ids.clone(),
            instance_types: self.spec.node_group.instance_types.clone(),
            scaling_config: ScalingConfig {
                desired_size: self.spec.node_group.desired_size,
                min_size: self.spec.node_group.min_size,
                max_size: self.spec.node_group.max_size,
            },
            disk_size: self.spec.node_group.disk_size_gib,
            ami_type: self.spec.node_group.ami_type.clone(),
        }
        .into_map()
        .context(error::GraphSnafu {
            what: "node group".to_string(),
        })?;
        let mut node_group_node = ResourceNode::new(node_group.clone(), NodeKind::NodeGroup)
            .depends_on(&kube_proxy)
            .depends_on(&vpc_cni)
            .depends_on(&node_role)
            .with_spec(node_group_spec);
        for attachment in &node_role_attachments {
            node_group_node = node_group_node.depends_on(attachment);
        }
        graph.insert(node_group_node).context(error::GraphSnafu {
            what: "node group".to_string(),
        })?;
        phases.insert(node_group.clone(), BootstrapPhase::NodeGroupReady);

        // AddonsComplete: everything that needs schedulable nodes or federated identity.
        let coredns = attach(
            &mut graph,
            &cluster,
            AddonSpec::new(COREDNS_ADDON)
                .depends_on(&cluster)
                .depends_on(&node_group),
        )?;
        phases.insert(coredns, BootstrapPhase::AddonsComplete);

        let mut oidc_provider = None;
        let storage_addon = match (&self.federation, self.spec.ebs_csi_policy_target) {
            (Some(federation), EbsCsiPolicyTarget::FederatedRole) => {
                let provider = self
                    .binder
                    .register_provider(&mut graph, &federation.audiences, &federation.thumbprints)
                    .context(error::IdentitySnafu)?;
                phases.insert(provider.node().clone(), BootstrapPhase::AddonsComplete);

                let identity = ServiceAccountIdentity::new(
                    STORAGE_SERVICE_ACCOUNT_NAMESPACE,
                    STORAGE_SERVICE_ACCOUNT_NAME,
                )
                .context(error::IdentitySnafu)?;
                let service_account = self
                    .binder
                    .declare_service_account(&mut graph, &identity)
                    .context(error::IdentitySnafu)?;
                phases.insert(service_account, BootstrapPhase::AddonsComplete);

                let role = self
                    .binder
                    .issue_federated_role(
                        &mut graph,
                        &provider,
                        &[identity],
                        &[managed_policy_arn(&partition, EBS_CSI_POLICY)],
                    )
                    .context(error::IdentitySnafu)?;
                phases.insert(role.node().clone(), BootstrapPhase::AddonsComplete);
                let role_attachment = attachment_node_name(
                    role.node(),
                    &managed_policy_arn(&partition, EBS_CSI_POLICY),
                )
                .context(error::IdentitySnafu)?;
                phases.insert(role_attachment, BootstrapPhase::AddonsComplete);

                let storage = attach(
                    &mut graph,
                    &cluster,
                    AddonSpec::new(STORAGE_ADDON)
                        .update_conflict(UpdateConflict::Preserve)
                        .depends_on(&cluster)
                        .depends_on(&node_group)
                        .service_account_role(role.node().clone()),
                )?;
                phases.insert(storage.clone(), BootstrapPhase::AddonsComplete);
                oidc_provider = Some(provider.node().clone());
                Some(storage)
            }
            (_, EbsCsiPolicyTarget::NodeRole) => {
                // The storage permissions already sit on the node role; the add-on runs with the
                // node's identity and needs no federated trust.
                let storage = attach(
                    &mut graph,
                    &cluster,
                    AddonSpec::new(STORAGE_ADDON)
                        .update_conflict(UpdateConflict::Preserve)
                        .depends_on(&cluster)
                        .depends_on(&node_group),
                )?;
                phases.insert(storage.clone(), BootstrapPhase::AddonsComplete);
                Some(storage)
            }
            (None, EbsCsiPolicyTarget::FederatedRole) => {
                info!(
                    "Skipping add-on '{}': OIDC federation is not configured and a federated \
                     role is required",
                    STORAGE_ADDON
                );
                None
            }
        };

        graph.validate().context(error::GraphSnafu {
            what: "bootstrap graph".to_string(),
        })?;
        validate_network_ordering(&graph)?;

        Ok(BootstrapGraph {
            graph,
            phases,
            cluster,
            cluster_role,
            node_role,
            node_group,
            network_addons: vec![kube_proxy, vpc_cni],
            oidc_provider,
            storage_addon,
        })
    }
}

/// The ARN of a cloud-managed policy in the account's partition.
pub fn managed_policy_arn(partition: &str, policy: &str) -> String {
    format!("arn:{}:iam::aws:policy/{}", partition, policy)
}

/// A domain rule the generic graph cannot express: every managed node group must sit downstream
/// of the network add-ons, or nodes would register before pod networking exists.
pub fn validate_network_ordering(graph: &ResourceGraph) -> Result<()> {
    for addon in [KUBE_PROXY_ADDON, VPC_CNI_ADDON] {
        let addon_name = NodeName::new(addon).context(error::GraphSnafu {
            what: addon.to_string(),
        })?;
        if !graph.contains(&addon_name) {
            continue;
        }
        for node in graph.nodes().filter(|n| n.kind == NodeKind::NodeGroup) {
            ensure!(
                graph.transitively_depends_on(&node.name, &addon_name),
                error::NodeGroupMissingNetworkAddonSnafu {
                    node_group: node.name.to_string(),
                    addon: addon.to_string(),
                }
            );
        }
    }
    Ok(())
}

fn declare_service_role(
    graph: &mut ResourceGraph,
    name: &str,
    service: ServicePrincipal,
) -> Result<NodeName> {
    let node_name = NodeName::new(name).context(error::GraphSnafu {
        what: name.to_string(),
    })?;
    let document = service_trust_policy(service);
    graph
        .insert(
            ResourceNode::new(node_name.clone(), NodeKind::Role)
                .with_spec(role_spec(&node_name, &document)?),
        )
        .context(error::GraphSnafu {
            what: name.to_string(),
        })?;
    Ok(node_name)
}

fn role_spec(role: &NodeName, document: &TrustPolicyDocument) -> Result<Map<String, Value>> {
    let mut spec = Map::new();
    spec.insert(
        "assumeRolePolicy".to_string(),
        serde_json::to_value(document).context(error::TrustPolicySerializationSnafu {
            what: role.to_string(),
        })?,
    );
    Ok(spec)
}

fn attach_managed_policies(
    graph: &mut ResourceGraph,
    role: &NodeName,
    partition: &str,
    policies: &[&str],
) -> Result<Vec<NodeName>> {
    let mut attachments = Vec::with_capacity(policies.len());
    for policy in policies {
        let policy_arn = managed_policy_arn(partition, policy);
        let name = attachment_node_name(role, &policy_arn).context(error::IdentitySnafu)?;
        let spec = PolicyAttachmentSpec {
            role_node: role.to_string(),
            policy_arn,
        }
        .into_map()
        .context(error::GraphSnafu {
            what: role.to_string(),
        })?;
        graph
            .insert(
                ResourceNode::new(name.clone(), NodeKind::PolicyAttachment)
                    .depends_on(role)
                    .with_spec(spec),
            )
            .context(error::GraphSnafu {
                what: role.to_string(),
            })?;
        attachments.push(name);
    }
    Ok(attachments)
}

#[cfg(test)]
mod test {
    use super::{
        BootstrapPhase, ClusterBootstrap, ClusterSpec, EbsCsiPolicyTarget, FederationConfig,
        CLUSTER_NODE, CLUSTER_ROLE_NODE, KUBE_PROXY_ADDON, NODE_GROUP_NODE, STORAGE_ADDON,
        VPC_CNI_ADDON,
    };
    use nodeplane_identity::IdentityFact;
    use nodeplane_model::{NodeKind, NodeName};

    fn fact() -> IdentityFact {
        IdentityFact::new("arn:aws:iam::111111111111", "oidc.example.com", "chain-node").unwrap()
    }

    fn federation() -> FederationConfig {
        FederationConfig {
            audiences: vec!["sts.amazonaws.com".to_string()],
            thumbprints: vec!["abcd1234abcd1234abcd1234abcd1234abcd1234".to_string()],
        }
    }

    fn subnets() -> Vec<String> {
        vec!["subnet-1".to_string(), "subnet-2".to_string()]
    }

    fn name(s: &str) -> NodeName {
        NodeName::new(s).unwrap()
    }

    #[test]
    fn full_bootstrap_graph_is_acyclic_and_ordered() {
        let bootstrap = ClusterBootstrap::new(fact(), ClusterSpec::new(subnets()))
            .with_federation(federation());
        let built = bootstrap.build().unwrap();
        let order = built.graph().creation_order().unwrap();
        let position = |n: &str| {
            order
                .iter()
                .position(|x| x.as_str() == n)
                .unwrap_or_else(|| panic!("node '{}' missing from order", n))
        };
        assert!(position(CLUSTER_ROLE_NODE) < position(CLUSTER_NODE));
        assert!(position(CLUSTER_NODE) < position(KUBE_PROXY_ADDON));
        assert!(position(CLUSTER_NODE) < position(VPC_CNI_ADDON));
        assert!(position(KUBE_PROXY_ADDON) < position(NODE_GROUP_NODE));
        assert!(position(VPC_CNI_ADDON) < position(NODE_GROUP_NODE));
        assert!(position(NODE_GROUP_NODE) < position(STORAGE_ADDON));
    }

    #[test]
    fn cluster_depends_only_on_its_role() {
        let built = ClusterBootstrap::new(fact(), ClusterSpec::new(subnets()))
            .build()
            .unwrap();
        let cluster = built.graph().get(built.cluster()).unwrap();
        assert_eq!(cluster.depends_on.len(), 1);
        assert!(cluster.depends_on.contains(&name(CLUSTER_ROLE_NODE)));
    }

    #[test]
    fn node_group_depends_on_both_network_addons() {
        let built = ClusterBootstrap::new(fact(), ClusterSpec::new(subnets()))
            .build()
            .unwrap();
        let node_group = built.graph().get(built.node_group()).unwrap();
        assert!(node_group.depends_on.contains(&name(KUBE_PROXY_ADDON)));
        assert!(node_group.depends_on.contains(&name(VPC_CNI_ADDON)));
    }

    #[test]
    fn node_group_depends_on_the_full_node_role_chain() {
        let built = ClusterBootstrap::new(fact(), ClusterSpec::new(subnets()))
            .build()
            .unwrap();
        let node_group = built.graph().get(built.node_group()).unwrap();
        assert!(node_group.depends_on.contains(built.node_role()));
        // Three managed-policy attachments in the default (federated) layout.
        let attachment_deps = node_group
            .depends_on
            .iter()
            .filter(|dep| {
                built.graph().get(*dep).map(|n| n.kind) == Some(NodeKind::PolicyAttachment)
            })
            .count();
        assert_eq!(attachment_deps, 3);
    }

    #[test]
    fn storage_addon_transitively_depends_on_oidc_provider() {
        let built = ClusterBootstrap::new(fact(), ClusterSpec::new(subnets()))
            .with_federation(federation())
            .build()
            .unwrap();
        let storage = built.storage_addon().unwrap();
        let provider = built.oidc_provider().unwrap();
        assert!(built.graph().transitively_depends_on(storage, provider));
    }

    #[test]
    fn storage_addon_is_skipped_without_federation() {
        let built = ClusterBootstrap::new(fact(), ClusterSpec::new(subnets()))
            .build()
            .unwrap();
        assert!(built.storage_addon().is_none());
        assert!(built.oidc_provider().is_none());
        assert!(!built.graph().contains(&name(STORAGE_ADDON)));
    }

    #[test]
    fn node_role_target_attaches_storage_policy_broadly() {
        let mut spec = ClusterSpec::new(subnets());
        spec.ebs_csi_policy_target = EbsCsiPolicyTarget::NodeRole;
        let built = ClusterBootstrap::new(fact(), spec).build().unwrap();
        // Four attachments on the node group's dependency set and no federated role anywhere.
        let node_group = built.graph().get(built.node_group()).unwrap();
        let attachment_deps = node_group
            .depends_on
            .iter()
            .filter(|dep| {
                built.graph().get(*dep).map(|n| n.kind) == Some(NodeKind::PolicyAttachment)
            })
            .count();
        assert_eq!(attachment_deps, 4);
        assert!(built.storage_addon().is_some());
        assert!(built.oidc_provider().is_none());
    }

    #[test]
    fn end_to_end_node_set_matches_the_expected_shape() {
        let built = ClusterBootstrap::new(fact(), ClusterSpec::new(subnets()))
            .with_federation(federation())
            .build()
            .unwrap();
        let graph = built.graph();

        let providers = graph
            .nodes()
            .filter(|n| n.kind == NodeKind::OidcProvider)
            .count();
        assert_eq!(providers, 1);

        let clusters = graph.nodes().filter(|n| n.kind == NodeKind::Cluster).count();
        assert_eq!(clusters, 1);

        let node_groups = graph
            .nodes()
            .filter(|n| n.kind == NodeKind::NodeGroup)
            .count();
        assert_eq!(node_groups, 1);

        // Control-plane role, node role, federated storage role.
        let roles = graph.nodes().filter(|n| n.kind == NodeKind::Role).count();
        assert_eq!(roles, 3);

        // kube-proxy, vpc-cni, coredns, aws-ebs-csi-driver.
        let addons = graph.nodes().filter(|n| n.kind == NodeKind::Addon).count();
        assert_eq!(addons, 4);

        // One on the cluster role, three on the node role, one on the federated role.
        let attachments = graph
            .nodes()
            .filter(|n| n.kind == NodeKind::PolicyAttachment)
            .count();
        assert_eq!(attachments, 5);
    }

    #[test]
    fn node_group_without_a_network_addon_dependency_fails_validation() {
        use nodeplane_model::{ResourceGraph, ResourceNode};

        let mut graph = ResourceGraph::new();
        graph
            .insert(ResourceNode::new(name(CLUSTER_NODE), NodeKind::Cluster))
            .unwrap();
        graph
            .insert(
                ResourceNode::new(name(KUBE_PROXY_ADDON), NodeKind::Addon)
                    .depends_on(&name(CLUSTER_NODE)),
            )
            .unwrap();
        graph
            .insert(
                ResourceNode::new(name(VPC_CNI_ADDON), NodeKind::Addon)
                    .depends_on(&name(CLUSTER_NODE)),
            )
            .unwrap();
        // The node group depends on kube-proxy but the CNI edge was left out.
        graph
            .insert(
                ResourceNode::new(name(NODE_GROUP_NODE), NodeKind::NodeGroup)
                    .depends_on(&name(KUBE_PROXY_ADDON)),
            )
            .unwrap();

        let error = super::validate_network_ordering(&graph).unwrap_err();
        let message = error.to_string();
        assert!(message.contains(NODE_GROUP_NODE));
        assert!(message.contains(VPC_CNI_ADDON));
    }

    #[test]
    fn empty_subnet_set_is_fatal() {
        let result = ClusterBootstrap::new(fact(), ClusterSpec::new(Vec::new())).build();
        assert!(result.is_err());
    }

    #[test]
    fn phases_are_assigned_in_order() {
        let built = ClusterBootstrap::new(fact(), ClusterSpec::new(subnets()))
            .with_federation(federation())
            .build()
            .unwrap();
        assert_eq!(
            built.phase(built.cluster_role()),
            Some(BootstrapPhase::RoleReady)
        );
        assert_eq!(
            built.phase(built.cluster()),
            Some(BootstrapPhase::ClusterReady)
        );
        assert_eq!(
            built.phase(&name(VPC_CNI_ADDON)),
            Some(BootstrapPhase::AddonsPartial)
        );
        assert_eq!(
            built.phase(built.node_group()),
            Some(BootstrapPhase::NodeGroupReady)
        );
        assert_eq!(
            built.phase(&name(STORAGE_ADDON)),
            Some(BootstrapPhase::AddonsComplete)
        );
        assert!(BootstrapPhase::RoleReady < BootstrapPhase::AddonsComplete);
    }
}
