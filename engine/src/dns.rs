use crate::error::{self, Result};
use nodeplane_model::{NodeKind, NodeName, ProducedHandles, ResourceGraph, ResourceNode};
use serde_json::{Map, Value};
use snafu::ResultExt;

/// Declare a DNS record whose value is a hostname another node produced, typically a service's
/// load-balancer hostname read from an ingress status field. The hostname must be ready: a
/// pending value surfaces as a retryable error rather than being published as an empty record.
pub fn declare_dns_record(
    graph: &mut ResourceGraph,
    record: &NodeName,
    fqdn: &str,
    source: &NodeName,
    handles: &ProducedHandles,
) -> Result<NodeName> {
    let hostname = handles
        .require(source, "hostname")
        .context(error::DnsValueSnafu {
            record: record.to_string(),
        })?;

    let mut spec = Map::new();
    spec.insert("fqdn".to_string(), Value::String(fqdn.to_string()));
    spec.insert("value".to_string(), Value::String(hostname.to_string()));
    spec.insert("sourceNode".to_string(), Value::String(source.to_string()));
    graph
        .insert(
            ResourceNode::new(record.clone(), NodeKind::DnsRecord)
                .depends_on(source)
                .with_spec(spec),
        )
        .context(error::GraphSnafu)
}
