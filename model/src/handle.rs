use crate::error::{self, Result};
use crate::node::NodeName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One opaque reference produced by the engine for a node (an ARN, a name, a hostname). Values
/// that the cloud assigns asynchronously, such as a load balancer hostname read from an ingress
/// status field, start out `Pending` and must never be defaulted to an empty string.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub enum HandleValue {
    Ready(String),
    Pending,
}

impl HandleValue {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending => None,
        }
    }
}

/// The handles a node has produced, keyed by a stable handle name such as `arn` or `hostname`.
/// Consumers treat these as read-only facts once the engine reports success.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Default)]
#[serde(transparent)]
pub struct ProducedHandles(BTreeMap<String, HandleValue>);

impl ProducedHandles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, key: S, value: HandleValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&HandleValue> {
        self.0.get(key)
    }

    /// Get a ready handle value. A missing handle is fatal; a pending handle is surfaced as an
    /// explicit retryable error so the caller can wait instead of publishing an invalid value.
    pub fn require(&self, node: &NodeName, key: &str) -> Result<&str> {
        match self.0.get(key) {
            None => Err(error::HandleMissingSnafu {
                node: node.to_string(),
                handle: key.to_string(),
            }
            .build()
            .into()),
            Some(HandleValue::Pending) => Err(error::HandlePendingSnafu {
                node: node.to_string(),
                handle: key.to_string(),
            }
            .build()
            .into()),
            Some(HandleValue::Ready(value)) => Ok(value),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HandleValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, HandleValue)> for ProducedHandles {
    fn from_iter<T: IntoIterator<Item = (String, HandleValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
