/*!

This library builds the cluster bootstrap graph: the EKS control plane, its IAM roles, the
network add-ons, the managed node group, and the add-ons that assume federated identity. The
output is a validated dependency graph; ordering lives in the graph's edges, never in the
sequence the nodes happen to be declared in.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use addon::{attach, AddonSpec, CreateConflict, UpdateConflict};
pub use cluster::{
    managed_policy_arn, validate_network_ordering, BootstrapGraph, BootstrapPhase,
    ClusterBootstrap, ClusterSpec, EbsCsiPolicyTarget, FederationConfig, NodeGroupSpec,
    CLUSTER_NODE, CLUSTER_ROLE_NODE, COREDNS_ADDON, KUBE_PROXY_ADDON, NODE_GROUP_NODE,
    NODE_ROLE_NODE, STORAGE_ADDON, VPC_CNI_ADDON,
};
pub use error::{Error, Result};
pub use kubeconfig::render_kubeconfig;

mod addon;
mod cluster;
mod error;
mod kubeconfig;
