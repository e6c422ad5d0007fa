use crate::error::{self, Result};
use crate::fact::IdentityFact;
use crate::service_account::ServiceAccountIdentity;
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::collections::BTreeMap;

/// The policy language version the trust documents declare.
pub const POLICY_VERSION: &str = "2008-10-17";

/// The one audience a federated role ever trusts.
pub const STS_AUDIENCE: &str = "sts.amazonaws.com";

const ASSUME_ROLE: &str = "sts:AssumeRole";
const ASSUME_ROLE_WITH_WEB_IDENTITY: &str = "sts:AssumeRoleWithWebIdentity";

/// An IAM trust-policy document. Documents are always built through the typed constructors below
/// and serialized with `serde_json` at the boundary; callers never concatenate identity strings
/// into JSON.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct TrustPolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    pub principal: Principal,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
pub enum Effect {
    Allow,
    Deny,
}

/// The two principal kinds this system issues trust for: a cloud service, or the cluster's
/// federated OIDC identity provider.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
pub enum Principal {
    Service(String),
    Federated(String),
}

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Default)]
pub struct Condition {
    #[serde(rename = "StringEquals")]
    pub string_equals: BTreeMap<String, String>,
}

/// The cloud services that may assume the roles this system creates.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum ServicePrincipal {
    Eks,
    Ec2,
}

impl ServicePrincipal {
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Eks => "eks.amazonaws.com",
            Self::Ec2 => "ec2.amazonaws.com",
        }
    }
}

/// Render the trust policy allowing a cloud service to assume a role.
pub fn service_trust_policy(service: ServicePrincipal) -> TrustPolicyDocument {
    TrustPolicyDocument {
        version: POLICY_VERSION.to_string(),
        statement: vec![Statement {
            sid: None,
            effect: Effect::Allow,
            principal: Principal::Service(service.domain().to_string()),
            action: ASSUME_ROLE.to_string(),
            condition: None,
        }],
    }
}

/// Render the trust policy binding a role to exactly one Kubernetes service account via the
/// cluster's OIDC provider. The audience and subject condition keys are derived from the identity
/// fact, and the subject string from the service account identity itself; a mismatch between the
/// trust policy and the service account is therefore unrepresentable.
///
/// Exactly one subject must be supplied. Federated trust wider than a single service account is
/// rejected rather than rendered.
pub fn federated_trust_policy(
    fact: &IdentityFact,
    subjects: &[ServiceAccountIdentity],
) -> Result<TrustPolicyDocument> {
    ensure!(
        subjects.len() == 1,
        error::SubjectCountSnafu {
            count: subjects.len()
        }
    );
    let subject = &subjects[0];

    let mut string_equals = BTreeMap::new();
    string_equals.insert(fact.audience_key(), STS_AUDIENCE.to_string());
    string_equals.insert(fact.subject_key(), subject.subject());

    Ok(TrustPolicyDocument {
        version: POLICY_VERSION.to_string(),
        statement: vec![Statement {
            sid: None,
            effect: Effect::Allow,
            principal: Principal::Federated(fact.provider_arn()),
            action: ASSUME_ROLE_WITH_WEB_IDENTITY.to_string(),
            condition: Some(Condition { string_equals }),
        }],
    })
}

impl TrustPolicyDocument {
    /// Recover the OIDC issuer host from a federated document's condition keys. Returns `None`
    /// for service-principal documents, which carry no conditions.
    pub fn issuer_host(&self) -> Option<&str> {
        self.statement
            .iter()
            .filter_map(|statement| statement.condition.as_ref())
            .flat_map(|condition| condition.string_equals.keys())
            .find_map(|key| key.strip_suffix(":aud"))
    }

    /// The subject condition values across all statements. A well-formed federated document has
    /// exactly one.
    pub fn subjects(&self) -> Vec<&str> {
        self.statement
            .iter()
            .filter_map(|statement| statement.condition.as_ref())
            .flat_map(|condition| condition.string_equals.iter())
            .filter(|(key, _)| key.ends_with(":sub"))
            .map(|(_, value)| value.as_str())
            .collect()
    }
}
