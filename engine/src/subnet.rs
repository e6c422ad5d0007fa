use crate::error::Result;
use async_trait::async_trait;

/// Resolves the subnets of a VPC. The returned identifiers are opaque to this system and pass
/// through unmodified to cluster and node-group creation.
#[async_trait]
pub trait SubnetDiscovery: Send + Sync {
    async fn subnet_ids(&self, vpc_id: &str) -> Result<Vec<String>>;
}

/// A discovery source with a fixed answer, for environments where the subnet set is part of the
/// stack configuration rather than looked up.
#[derive(Debug, Clone, Default)]
pub struct StaticSubnets {
    subnet_ids: Vec<String>,
}

impl StaticSubnets {
    pub fn new(subnet_ids: Vec<String>) -> Self {
        Self { subnet_ids }
    }
}

#[async_trait]
impl SubnetDiscovery for StaticSubnets {
    async fn subnet_ids(&self, _vpc_id: &str) -> Result<Vec<String>> {
        Ok(self.subnet_ids.clone())
    }
}
