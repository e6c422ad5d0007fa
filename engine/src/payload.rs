use crate::error::{self, Result};
use nodeplane_model::{NodeKind, NodeName, ResourceNode};
use serde_json::{Map, Value};
use snafu::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};

/// An opaque configuration file (node software config, Helm values, dashboard JSON) embedded
/// verbatim into a generated resource. The content is never inspected or templated here.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PayloadFile {
    path: PathBuf,
    content: Vec<u8>,
}

impl PayloadFile {
    /// Read the file once, in full. A missing or unreadable file is fatal at startup, with the
    /// path in the error; no partial-content recovery is attempted.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read(&path).context(error::PayloadReadSnafu { path: path.clone() })?;
        Ok(Self { path, content })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Declare this payload as a config-payload node. The byte content rides along base64-encoded
    /// so the node spec stays valid JSON regardless of the file's encoding.
    pub fn into_node(self, name: NodeName) -> ResourceNode {
        let mut spec = Map::new();
        spec.insert(
            "fileName".to_string(),
            Value::String(self.path.to_string_lossy().to_string()),
        );
        spec.insert(
            "contentBase64".to_string(),
            Value::String(base64::encode(&self.content)),
        );
        ResourceNode::new(name, NodeKind::ConfigPayload).with_spec(spec)
    }
}
