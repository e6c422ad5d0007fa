use crate::error::{self, Result};
use nodeplane_model::NodeName;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::fmt::{Display, Formatter};

/// One Kubernetes service account, identified by namespace and name. The federated trust subject
/// string is derived from this identity, never written out by hand, so the subject condition in a
/// trust policy can only ever match the service account it was issued for.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Ord, PartialOrd, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountIdentity {
    namespace: String,
    name: String,
}

impl ServiceAccountIdentity {
    pub fn new<S1, S2>(namespace: S1, name: S2) -> Result<Self>
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let namespace = namespace.into();
        let name = name.into();
        for (what, value) in [("namespace", &namespace), ("name", &name)] {
            if value.is_empty() {
                return error::InvalidServiceAccountSnafu {
                    identity: format!("{}/{}", namespace, name),
                    reason: format!("the {} may not be empty", what),
                }
                .fail();
            }
            if !value
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            {
                return error::InvalidServiceAccountSnafu {
                    identity: format!("{}/{}", namespace, name),
                    reason: format!(
                        "the {} must be a DNS-1123 label (lowercase alphanumerics and dashes)",
                        what
                    ),
                }
                .fail();
            }
        }
        Ok(Self { namespace, name })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The subject claim a token for this service account carries.
    pub fn subject(&self) -> String {
        format!("system:serviceaccount:{}:{}", self.namespace, self.name)
    }

    /// The stable name of the graph node declaring this service account.
    pub fn node_name(&self) -> Result<NodeName> {
        NodeName::new(format!("{}-{}", self.namespace, self.name)).context(error::GraphSnafu {
            what: self.subject(),
        })
    }

    /// The stable name of the graph node for the IAM role federated to this service account.
    pub fn role_node_name(&self) -> Result<NodeName> {
        NodeName::new(format!("{}-{}-role", self.namespace, self.name)).context(
            error::GraphSnafu {
                what: self.subject(),
            },
        )
    }
}

impl Display for ServiceAccountIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.subject())
    }
}
