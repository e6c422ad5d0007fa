use async_trait::async_trait;
use nodeplane_engine::{ProvisionError, ProvisionResult, ProvisioningEngine};
use nodeplane_model::{HandleValue, NodeName, ProducedHandles, ResourceNode};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// An in-memory engine that records the order nodes arrive in and synthesizes handles for each.
/// Individual nodes can be made to fail, or to report their hostname handle as not yet assigned.
pub struct RecordingEngine {
    created: Arc<Mutex<Vec<NodeName>>>,
    fail_on: Option<NodeName>,
    pending_hostname: BTreeSet<NodeName>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            created: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
            pending_hostname: BTreeSet::new(),
        }
    }

    pub fn fail_on(mut self, node: NodeName) -> Self {
        self.fail_on = Some(node);
        self
    }

    pub fn pending_hostname_for(mut self, node: NodeName) -> Self {
        self.pending_hostname.insert(node);
        self
    }

    /// A handle on the creation log that stays readable after the engine moves into the emitter.
    pub fn created_log(&self) -> CreationLog {
        CreationLog(self.created.clone())
    }
}

pub struct CreationLog(Arc<Mutex<Vec<NodeName>>>);

impl CreationLog {
    pub fn entries(&self) -> Vec<NodeName> {
        match self.0.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ProvisioningEngine for RecordingEngine {
    async fn create(&self, node: &ResourceNode) -> ProvisionResult<ProducedHandles> {
        if self.fail_on.as_ref() == Some(&node.name) {
            return Err(ProvisionError::new("simulated create failure"));
        }
        if let Ok(mut created) = self.created.lock() {
            created.push(node.name.clone());
        }

        let mut handles = ProducedHandles::new();
        handles.insert(
            "arn",
            HandleValue::Ready(format!("arn:aws:mock:::{}", node.name)),
        );
        handles.insert("name", HandleValue::Ready(node.name.to_string()));
        if self.pending_hostname.contains(&node.name) {
            handles.insert("hostname", HandleValue::Pending);
        }
        Ok(handles)
    }
}
