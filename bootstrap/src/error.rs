use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display(
        "Add-on '{}' was attached without the cluster node '{}' in its dependency set",
        addon,
        cluster
    ))]
    AddonMissingClusterDependency { addon: String, cluster: String },

    #[snafu(display(
        "Add-on '{}' references role node '{}' which has not been declared",
        addon,
        role
    ))]
    AddonRoleUndeclared { addon: String, role: String },

    #[snafu(display("A cluster cannot be created with an empty subnet set"))]
    EmptySubnetSet,

    #[snafu(display("Error declaring node for '{}': {}", what, source))]
    Graph {
        what: String,
        source: nodeplane_model::Error,
    },

    #[snafu(display("Identity error: {}", source))]
    Identity { source: nodeplane_identity::Error },

    #[snafu(display(
        "Node group '{}' does not depend on the network add-on '{}': nodes would register \
         before pod networking exists",
        node_group,
        addon
    ))]
    NodeGroupMissingNetworkAddon { node_group: String, addon: String },

    #[snafu(display("Error rendering kubeconfig for cluster '{}': {}", cluster_name, source))]
    KubeconfigSerialization {
        cluster_name: String,
        source: serde_yaml::Error,
    },

    #[snafu(display("Error serializing trust policy for '{}': {}", what, source))]
    TrustPolicySerialization {
        what: String,
        source: serde_json::Error,
    },
}
