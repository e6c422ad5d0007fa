/*!

This library establishes cross-domain trust between Kubernetes workloads and cloud IAM. It renders
IAM trust-policy documents from a small set of identity facts, registers the cluster's OIDC
identity provider, and issues IAM roles whose trust is scoped to exactly one Kubernetes service
account identity.

Trust documents are built as a small typed AST and serialized at the boundary; identity strings
are never assembled by literal concatenation, so a rename of a service account always flows
through to the trust policy that authorizes it.

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

pub use binder::{attachment_node_name, FederatedRole, FederationBinder, OidcProvider};
pub use error::{Error, Result};
pub use fact::IdentityFact;
pub use policy::{
    federated_trust_policy, service_trust_policy, Condition, Effect, Principal, ServicePrincipal,
    Statement, TrustPolicyDocument, POLICY_VERSION, STS_AUDIENCE,
};
pub use service_account::ServiceAccountIdentity;

mod binder;
mod error;
mod fact;
mod policy;
mod service_account;
