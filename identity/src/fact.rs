use crate::error::{self, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};
use url::Url;

lazy_static! {
    /// The account section of an ARN: partition and account id, e.g. `arn:aws:iam::111111111111`.
    static ref ARN_ACCOUNT_PREFIX: Regex = {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"^arn:(?P<partition>[a-z][a-z-]*):iam::(?P<account>\d{12})$").unwrap()
    };
}

/// The immutable identity facts a provisioning run starts from. Everything identity-related is
/// derived mechanically from these three values so that no ARN, issuer URL, or condition key is
/// ever duplicated as an independent literal.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IdentityFact {
    account_arn_prefix: String,
    oidc_issuer_host: String,
    cluster_name: String,
}

impl IdentityFact {
    /// Validate and capture the identity facts. `oidc_issuer_host` must be scheme-less; the
    /// protocol-qualified variant is derived by [`IdentityFact::issuer_url`].
    pub fn new<S1, S2, S3>(
        account_arn_prefix: S1,
        oidc_issuer_host: S2,
        cluster_name: S3,
    ) -> Result<Self>
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        let account_arn_prefix = account_arn_prefix.into();
        let oidc_issuer_host = oidc_issuer_host.into();
        let cluster_name = cluster_name.into();

        ensure!(!oidc_issuer_host.is_empty(), error::EmptyIssuerHostSnafu);
        ensure!(
            !oidc_issuer_host.contains("://"),
            error::SchemeInIssuerHostSnafu {
                host: oidc_issuer_host
            }
        );
        ensure!(
            ARN_ACCOUNT_PREFIX.is_match(&account_arn_prefix),
            error::MalformedArnPrefixSnafu {
                prefix: account_arn_prefix
            }
        );
        // The derived issuer URL must itself be well formed, or workload token exchange will fail
        // at runtime rather than here.
        Url::parse(&format!("https://{}", oidc_issuer_host)).context(
            error::InvalidIssuerHostSnafu {
                host: oidc_issuer_host.clone(),
            },
        )?;

        Ok(Self {
            account_arn_prefix,
            oidc_issuer_host,
            cluster_name,
        })
    }

    pub fn account_arn_prefix(&self) -> &str {
        &self.account_arn_prefix
    }

    pub fn oidc_issuer_host(&self) -> &str {
        &self.oidc_issuer_host
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// The ARN partition, e.g. `aws` or `aws-us-gov`.
    pub fn partition(&self) -> &str {
        // The prefix was validated at construction, so the second ARN section is present.
        self.account_arn_prefix
            .split(':')
            .nth(1)
            .unwrap_or_default()
    }

    /// The protocol-qualified issuer URL.
    pub fn issuer_url(&self) -> String {
        format!("https://{}", self.oidc_issuer_host)
    }

    /// The ARN of the OIDC identity provider registered for this issuer.
    pub fn provider_arn(&self) -> String {
        format!(
            "{}:oidc-provider/{}",
            self.account_arn_prefix, self.oidc_issuer_host
        )
    }

    /// The `StringEquals` condition key for the token audience claim.
    pub fn audience_key(&self) -> String {
        format!("{}:aud", self.oidc_issuer_host)
    }

    /// The `StringEquals` condition key for the token subject claim.
    pub fn subject_key(&self) -> String {
        format!("{}:sub", self.oidc_issuer_host)
    }
}

#[cfg(test)]
mod test {
    use super::IdentityFact;

    fn fact() -> IdentityFact {
        IdentityFact::new("arn:aws:iam::111111111111", "oidc.example.com", "chain-node").unwrap()
    }

    #[test]
    fn condition_keys_are_derived_from_issuer_host() {
        let fact = fact();
        assert_eq!(fact.audience_key(), "oidc.example.com:aud");
        assert_eq!(fact.subject_key(), "oidc.example.com:sub");
    }

    #[test]
    fn issuer_url_is_derived_not_configured() {
        assert_eq!(fact().issuer_url(), "https://oidc.example.com");
    }

    #[test]
    fn provider_arn_uses_account_prefix_and_host() {
        assert_eq!(
            fact().provider_arn(),
            "arn:aws:iam::111111111111:oidc-provider/oidc.example.com"
        );
    }

    #[test]
    fn partition_is_extracted() {
        assert_eq!(fact().partition(), "aws");
        let gov =
            IdentityFact::new("arn:aws-us-gov:iam::111111111111", "oidc.example.com", "c").unwrap();
        assert_eq!(gov.partition(), "aws-us-gov");
    }

    #[test]
    fn scheme_qualified_issuer_is_rejected() {
        assert!(IdentityFact::new(
            "arn:aws:iam::111111111111",
            "https://oidc.example.com",
            "chain-node"
        )
        .is_err());
    }

    #[test]
    fn empty_issuer_is_rejected() {
        assert!(IdentityFact::new("arn:aws:iam::111111111111", "", "chain-node").is_err());
    }

    #[test]
    fn malformed_arn_prefix_is_rejected() {
        for prefix in [
            "arn:aws:iam::1111",
            "arn:aws:ec2::111111111111",
            "111111111111",
            "arn:aws:iam::111111111111:role/foo",
        ] {
            assert!(
                IdentityFact::new(prefix, "oidc.example.com", "chain-node").is_err(),
                "expected '{}' to be rejected",
                prefix
            );
        }
    }
}
