use crate::error::{self, Result};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

/// A kubeconfig granting access to one cluster, authenticating with short-lived cloud-issued
/// tokens via an exec plugin. The document never embeds client credentials.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Kubeconfig {
    #[serde(rename = "apiVersion")]
    api_version: String,
    kind: String,
    clusters: Vec<NamedCluster>,
    contexts: Vec<NamedContext>,
    #[serde(rename = "current-context")]
    current_context: String,
    users: Vec<NamedUser>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct NamedCluster {
    name: String,
    cluster: ClusterEndpoint,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ClusterEndpoint {
    server: String,
    #[serde(rename = "certificate-authority-data")]
    certificate_authority_data: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct NamedContext {
    name: String,
    context: Context,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Context {
    cluster: String,
    user: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct NamedUser {
    name: String,
    user: User,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct User {
    exec: ExecConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ExecConfig {
    #[serde(rename = "apiVersion")]
    api_version: String,
    command: String,
    args: Vec<String>,
}

/// Render a kubeconfig for the named cluster. `endpoint` and `certificate_authority_data` are the
/// values the cluster reports once it is stable; the caller resolves them through the node's
/// produced handles, never from configuration.
pub fn render_kubeconfig(
    cluster_name: &str,
    endpoint: &str,
    certificate_authority_data: &str,
) -> Result<String> {
    let context_name = format!("{}-context", cluster_name);
    let config = Kubeconfig {
        api_version: "v1".to_string(),
        kind: "Config".to_string(),
        clusters: vec![NamedCluster {
            name: cluster_name.to_string(),
            cluster: ClusterEndpoint {
                server: endpoint.to_string(),
                certificate_authority_data: certificate_authority_data.to_string(),
            },
        }],
        contexts: vec![NamedContext {
            name: context_name.clone(),
            context: Context {
                cluster: cluster_name.to_string(),
                user: cluster_name.to_string(),
            },
        }],
        current_context: context_name,
        users: vec![NamedUser {
            name: cluster_name.to_string(),
            user: User {
                exec: ExecConfig {
                    api_version: "client.authentication.k8s.io/v1beta1".to_string(),
                    command: "aws".to_string(),
                    args: vec![
                        "eks".to_string(),
                        "get-token".to_string(),
                        "--cluster-name".to_string(),
                        cluster_name.to_string(),
                    ],
                },
            },
        }],
    };
    serde_yaml::to_string(&config).context(error::KubeconfigSerializationSnafu {
        cluster_name: cluster_name.to_string(),
    })
}
