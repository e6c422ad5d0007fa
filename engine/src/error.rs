use snafu::Snafu;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Error resolving DNS record '{}': {}", record, source))]
    DnsValue {
        record: String,
        source: nodeplane_model::Error,
    },

    #[snafu(display("The engine failed creating node '{}': {}", node, source))]
    Engine {
        node: String,
        source: crate::provision::ProvisionError,
    },

    #[snafu(display("Error resolving export '{}': {}", name, source))]
    Export {
        name: String,
        source: nodeplane_model::Error,
    },

    #[snafu(display("Topology error: {}", source))]
    Graph { source: nodeplane_model::Error },

    #[snafu(display("Required configuration key '{}' is absent", key))]
    MissingConfigKey { key: String },

    #[snafu(display("Required secret '{}' is absent", key))]
    MissingSecret { key: String },

    #[snafu(display("Unable to read payload file '{}': {}", path.display(), source))]
    PayloadRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Whether a later attempt may succeed once the external engine has made more progress. Only
    /// a handle that is pending resolution qualifies; everything else is fatal for this run.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::DnsValue { source, .. } | Self::Export { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}
