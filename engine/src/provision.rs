use async_trait::async_trait;
use nodeplane_model::{ProducedHandles, ResourceNode};
use snafu::Snafu;

/// An error reported by the external provisioning engine for one resource operation. The message
/// is whatever the engine said, carried verbatim; the emitter attaches the node identity.
#[derive(Debug, Snafu)]
#[snafu(display("{}", message))]
pub struct ProvisionError {
    message: String,
}

impl ProvisionError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type ProvisionResult<T> = std::result::Result<T, ProvisionError>;

/// The seam to the external provisioning engine. The engine owns create/update/delete semantics,
/// per-resource retry and backoff, and idempotent reconciliation by stable node name; this system
/// only hands it nodes in dependency order and reads the handles back.
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Materialize one node. Called only after every node in its dependency set has been created
    /// and its handles propagated.
    async fn create(&self, node: &ResourceNode) -> ProvisionResult<ProducedHandles>;
}
