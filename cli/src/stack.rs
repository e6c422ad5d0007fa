use anyhow::{Context, Result};
use nodeplane_bootstrap::{
    BootstrapGraph, ClusterBootstrap, ClusterSpec, EbsCsiPolicyTarget, FederationConfig,
    NodeGroupSpec,
};
use nodeplane_engine::{ConfigSource, MemoryConfigSource, StaticSubnets, SubnetDiscovery};
use nodeplane_identity::IdentityFact;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_AUDIENCE: &str = "sts.amazonaws.com";

/// One environment's stack configuration file. Scalar fields feed the engine's key-value
/// configuration facility; every key this system requires is checked before any node is declared.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StackFile {
    cluster_name: String,
    vpc_id: String,
    oidc_url: String,
    oidc_thumbprint: String,
    arn_account_section: String,
    subnet_ids: Vec<String>,
    #[serde(default)]
    audiences: Vec<String>,
    #[serde(default)]
    node_group: Option<NodeGroupSpec>,
    #[serde(default)]
    ebs_csi_policy_target: Option<EbsCsiPolicyTarget>,
    #[serde(default)]
    secrets: BTreeMap<String, String>,
}

/// A loaded stack: the config source plus the non-scalar inputs that do not flow through it.
#[derive(Debug)]
pub(crate) struct Stack {
    source: MemoryConfigSource,
    subnet_ids: Vec<String>,
    audiences: Vec<String>,
    node_group: Option<NodeGroupSpec>,
    ebs_csi_policy_target: Option<EbsCsiPolicyTarget>,
}

impl Stack {
    pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Unable to read stack config '{}'", path.display()))?;
        let file: StackFile = serde_yaml::from_str(&content)
            .context(format!("Unable to parse stack config '{}'", path.display()))?;

        let mut source = MemoryConfigSource::new()
            .with_value("clusterName", file.cluster_name)
            .with_value("vpcId", file.vpc_id)
            .with_value("oidcUrl", file.oidc_url)
            .with_value("oidcThumbprint", file.oidc_thumbprint)
            .with_value("arnAccountSection", file.arn_account_section);
        for (key, value) in file.secrets {
            source = source.with_secret(key, value);
        }

        Ok(Self {
            source,
            subnet_ids: file.subnet_ids,
            audiences: file.audiences,
            node_group: file.node_group,
            ebs_csi_policy_target: file.ebs_csi_policy_target,
        })
    }

    /// Build and validate the bootstrap graph. Required config keys and secrets are resolved
    /// first so a missing one fails before a single node exists.
    pub(crate) async fn bootstrap(&self) -> Result<BootstrapGraph> {
        let cluster_name = self.source.require("clusterName")?;
        let vpc_id = self.source.require("vpcId")?;
        let oidc_url = self.source.require("oidcUrl")?;
        let thumbprint = self.source.require("oidcThumbprint")?;
        let arn_account_section = self.source.require("arnAccountSection")?;
        self.source.require_secret("execution-jwt")?;
        self.source.require_secret("sshKey")?;

        let fact = IdentityFact::new(arn_account_section, oidc_url, cluster_name)
            .context("Invalid identity configuration")?;

        let discovery = StaticSubnets::new(self.subnet_ids.clone());
        let subnet_ids = discovery
            .subnet_ids(&vpc_id)
            .await
            .context(format!("Unable to discover subnets of '{}'", vpc_id))?;

        let mut spec = ClusterSpec::new(subnet_ids);
        if let Some(node_group) = &self.node_group {
            spec.node_group = node_group.clone();
        }
        if let Some(target) = self.ebs_csi_policy_target {
            spec.ebs_csi_policy_target = target;
        }

        let mut audiences = self.audiences.clone();
        if audiences.is_empty() {
            audiences.push(DEFAULT_AUDIENCE.to_string());
        }
        let federation = FederationConfig {
            audiences,
            thumbprints: vec![thumbprint],
        };

        ClusterBootstrap::new(fact, spec)
            .with_federation(federation)
            .build()
            .context("Unable to build the bootstrap topology")
    }
}

#[cfg(test)]
mod test {
    use super::Stack;
    use std::io::Write;

    const STACK: &str = r#"
clusterName: chain-node
vpcId: vpc-123
oidcUrl: oidc.example.com
oidcThumbprint: abcd1234abcd1234abcd1234abcd1234abcd1234
arnAccountSection: arn:aws:iam::111111111111
subnetIds:
  - subnet-1
  - subnet-2
secrets:
  execution-jwt: jwt-value
  sshKey: ssh-value
"#;

    fn write_stack(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn full_stack_file_builds_a_topology() {
        let file = write_stack(STACK);
        let stack = Stack::load(file.path()).unwrap();
        let built = stack.bootstrap().await.unwrap();
        assert!(built.storage_addon().is_some());
    }

    #[tokio::test]
    async fn missing_secret_fails_before_any_node_is_declared() {
        let file = write_stack(&STACK.replace("  execution-jwt: jwt-value\n", ""));
        let stack = Stack::load(file.path()).unwrap();
        let error = stack.bootstrap().await.unwrap_err();
        assert!(error.to_string().contains("execution-jwt"));
    }

    #[test]
    fn unknown_stack_fields_are_rejected() {
        let file = write_stack(&format!("{}\nunknownField: x\n", STACK));
        assert!(Stack::load(file.path()).is_err());
    }
}
