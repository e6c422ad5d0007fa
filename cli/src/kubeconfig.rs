use anyhow::{Context, Result};
use clap::Parser;
use nodeplane_bootstrap::render_kubeconfig;

/// Render a kubeconfig for a cluster from its reported endpoint and CA data.
#[derive(Debug, Parser)]
pub(crate) struct Kubeconfig {
    /// The cluster's name.
    #[clap(long = "cluster-name")]
    cluster_name: String,

    /// The cluster's API server endpoint.
    #[clap(long = "endpoint")]
    endpoint: String,

    /// The cluster's base64-encoded certificate authority data.
    #[clap(long = "certificate-authority-data")]
    certificate_authority_data: String,
}

impl Kubeconfig {
    pub(crate) fn run(self) -> Result<()> {
        let rendered = render_kubeconfig(
            &self.cluster_name,
            &self.endpoint,
            &self.certificate_authority_data,
        )
        .context(format!(
            "Unable to render kubeconfig for '{}'",
            self.cluster_name
        ))?;
        println!("{}", rendered);
        Ok(())
    }
}
