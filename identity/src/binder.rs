use crate::error::{self, Result};
use crate::fact::IdentityFact;
use crate::policy::federated_trust_policy;
use crate::service_account::ServiceAccountIdentity;
use log::info;
use nodeplane_model::{NodeKind, NodeName, ResourceGraph, ResourceNode};
use serde_json::{json, Map, Value};
use snafu::{ensure, ResultExt};

/// The registered OIDC identity provider node and the ARN it will carry once materialized. The
/// ARN is derivable up front because it is a pure function of the account prefix and issuer host.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OidcProvider {
    node: NodeName,
    arn: String,
}

impl OidcProvider {
    pub fn node(&self) -> &NodeName {
        &self.node
    }

    pub fn arn(&self) -> &str {
        &self.arn
    }
}

/// A role issued for one federated service account.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FederatedRole {
    node: NodeName,
    service_account: NodeName,
}

impl FederatedRole {
    pub fn node(&self) -> &NodeName {
        &self.node
    }

    pub fn service_account(&self) -> &NodeName {
        &self.service_account
    }
}

/// Declares the OIDC identity provider and issues IAM roles scoped to single Kubernetes service
/// accounts. Every node it declares lands in the caller's [`ResourceGraph`] with its ordering
/// edges; the binder itself performs no I/O.
#[derive(Debug, Clone)]
pub struct FederationBinder {
    fact: IdentityFact,
}

impl FederationBinder {
    pub fn new(fact: IdentityFact) -> Self {
        Self { fact }
    }

    pub fn fact(&self) -> &IdentityFact {
        &self.fact
    }

    /// Register the cluster's OIDC identity provider. An empty thumbprint list is fatal: without
    /// a thumbprint the provider would be registered with identity verification silently skipped.
    pub fn register_provider(
        &self,
        graph: &mut ResourceGraph,
        audiences: &[String],
        thumbprints: &[String],
    ) -> Result<OidcProvider> {
        ensure!(!thumbprints.is_empty(), error::EmptyThumbprintListSnafu);
        ensure!(!audiences.is_empty(), error::EmptyAudienceListSnafu);

        let name = NodeName::new(format!("{}-oidc-provider", self.fact.cluster_name())).context(
            error::InvalidClusterNameSnafu {
                cluster_name: self.fact.cluster_name(),
            },
        )?;

        let mut spec = Map::new();
        spec.insert("url".to_string(), Value::String(self.fact.issuer_url()));
        spec.insert("clientIdList".to_string(), json!(audiences));
        spec.insert("thumbprintList".to_string(), json!(thumbprints));

        graph
            .insert(ResourceNode::new(name.clone(), NodeKind::OidcProvider).with_spec(spec))
            .context(error::GraphSnafu {
                what: "oidc provider",
            })?;
        info!(
            "Registered OIDC provider '{}' for issuer '{}'",
            name,
            self.fact.oidc_issuer_host()
        );

        Ok(OidcProvider {
            node: name,
            arn: self.fact.provider_arn(),
        })
    }

    /// Declare the Kubernetes service account a federated role will be scoped to. The returned
    /// node must be in the dependency set of any role that trusts this identity, so that a rename
    /// of the service account forces re-evaluation of the role.
    pub fn declare_service_account(
        &self,
        graph: &mut ResourceGraph,
        identity: &ServiceAccountIdentity,
    ) -> Result<NodeName> {
        let name = identity.node_name()?;
        let mut spec = Map::new();
        spec.insert(
            "namespace".to_string(),
            Value::String(identity.namespace().to_string()),
        );
        spec.insert(
            "name".to_string(),
            Value::String(identity.name().to_string()),
        );
        graph
            .insert(ResourceNode::new(name.clone(), NodeKind::ServiceAccount).with_spec(spec))
            .context(error::GraphSnafu {
                what: identity.subject(),
            })?;
        Ok(name)
    }

    /// Issue an IAM role whose trust policy federates to exactly one service account, attaching
    /// the given managed policies. The service account must already be declared in the graph;
    /// the role depends on both the provider and the service account node.
    pub fn issue_federated_role(
        &self,
        graph: &mut ResourceGraph,
        provider: &OidcProvider,
        subjects: &[ServiceAccountIdentity],
        policy_arns: &[String],
    ) -> Result<FederatedRole> {
        let document = federated_trust_policy(&self.fact, subjects)?;
        let identity = &subjects[0];

        let service_account = identity.node_name()?;
        ensure!(
            graph.contains(&service_account),
            error::UndeclaredServiceAccountSnafu {
                subject: identity.subject()
            }
        );

        let role = identity.role_node_name()?;
        let mut spec = Map::new();
        spec.insert(
            "assumeRolePolicy".to_string(),
            serde_json::to_value(&document).context(error::PolicySerializationSnafu {
                what: identity.subject(),
            })?,
        );
        graph
            .insert(
                ResourceNode::new(role.clone(), NodeKind::Role)
                    .depends_on(provider.node())
                    .depends_on(&service_account)
                    .with_spec(spec),
            )
            .context(error::GraphSnafu {
                what: identity.subject(),
            })?;

        for policy_arn in policy_arns {
            let attachment = attachment_node_name(&role, policy_arn)?;
            let mut spec = Map::new();
            spec.insert("roleNode".to_string(), Value::String(role.to_string()));
            spec.insert(
                "policyArn".to_string(),
                Value::String(policy_arn.to_string()),
            );
            graph
                .insert(
                    ResourceNode::new(attachment, NodeKind::PolicyAttachment)
                        .depends_on(&role)
                        .with_spec(spec),
                )
                .context(error::GraphSnafu {
                    what: identity.subject(),
                })?;
        }

        info!(
            "Issued federated role '{}' scoped to '{}'",
            role,
            identity.subject()
        );
        Ok(FederatedRole {
            node: role,
            service_account,
        })
    }
}

/// A stable attachment node name derived from the role and the final segment of the policy ARN.
pub fn attachment_node_name(role: &NodeName, policy_arn: &str) -> Result<NodeName> {
    let slug: String = policy_arn
        .rsplit('/')
        .next()
        .unwrap_or(policy_arn)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    NodeName::new(format!("{}-{}", role, slug)).context(error::GraphSnafu {
        what: format!("policy attachment for '{}'", policy_arn),
    })
}
