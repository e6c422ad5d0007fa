mod mock;

use mock::RecordingEngine;
use nodeplane_engine::{ExportMap, TopologyEmitter};
use nodeplane_model::{NodeKind, NodeName, ResourceGraph, ResourceNode};

fn name(s: &str) -> NodeName {
    NodeName::new(s).unwrap()
}

fn bootstrap_shaped_graph() -> ResourceGraph {
    let mut graph = ResourceGraph::new();
    graph
        .insert(ResourceNode::new(name("cluster-role"), NodeKind::Role))
        .unwrap();
    graph
        .insert(
            ResourceNode::new(name("cluster"), NodeKind::Cluster)
                .depends_on(&name("cluster-role")),
        )
        .unwrap();
    graph
        .insert(ResourceNode::new(name("vpc-cni"), NodeKind::Addon).depends_on(&name("cluster")))
        .unwrap();
    graph
}

#[tokio::test]
async fn nodes_are_submitted_in_dependency_order() {
    let engine = RecordingEngine::new();
    let log = engine.created_log();
    let emitter = TopologyEmitter::new(engine);
    let graph = bootstrap_shaped_graph();
    emitter.submit(&graph, &ExportMap::new()).await.unwrap();

    let order = log.entries();
    let position = |n: &str| order.iter().position(|x| x.as_str() == n).unwrap();
    assert!(position("cluster-role") < position("cluster"));
    assert!(position("cluster") < position("vpc-cni"));
}

#[tokio::test]
async fn every_node_is_created_exactly_once() {
    let engine = RecordingEngine::new();
    let log = engine.created_log();
    let emitter = TopologyEmitter::new(engine);
    let graph = bootstrap_shaped_graph();
    emitter.submit(&graph, &ExportMap::new()).await.unwrap();

    let mut order = log.entries();
    assert_eq!(order.len(), 3);
    order.sort();
    order.dedup();
    assert_eq!(order.len(), 3);
}

#[tokio::test]
async fn engine_failure_names_the_failing_node() {
    let engine = RecordingEngine::new().fail_on(name("cluster"));
    let emitter = TopologyEmitter::new(engine);
    let graph = bootstrap_shaped_graph();
    let error = emitter.submit(&graph, &ExportMap::new()).await.unwrap_err();
    assert!(!error.is_retryable());
    let message = error.to_string();
    assert!(message.contains("cluster"));
    assert!(message.contains("simulated create failure"));
}

#[tokio::test]
async fn exports_are_resolved_from_produced_handles() {
    let emitter = TopologyEmitter::new(RecordingEngine::new());
    let graph = bootstrap_shaped_graph();
    let exports = ExportMap::new()
        .publish("clusterArn", &name("cluster"), "arn")
        .publish("clusterName", &name("cluster"), "name");
    let emitted = emitter.submit(&graph, &exports).await.unwrap();
    assert_eq!(emitted.export("clusterArn"), Some("arn:aws:mock:::cluster"));
    assert_eq!(emitted.export("clusterName"), Some("cluster"));
    assert_eq!(emitted.export("unpublished"), None);
}

#[tokio::test]
async fn pending_export_is_retryable() {
    let engine = RecordingEngine::new().pending_hostname_for(name("vpc-cni"));
    let emitter = TopologyEmitter::new(engine);
    let graph = bootstrap_shaped_graph();
    let exports = ExportMap::new().publish("lbHostname", &name("vpc-cni"), "hostname");
    let error = emitter.submit(&graph, &exports).await.unwrap_err();
    assert!(error.is_retryable());
    assert!(error.to_string().contains("lbHostname"));
}

#[tokio::test]
async fn export_of_a_never_produced_handle_is_fatal() {
    let emitter = TopologyEmitter::new(RecordingEngine::new());
    let graph = bootstrap_shaped_graph();
    let exports = ExportMap::new().publish("lbHostname", &name("cluster"), "hostname");
    let error = emitter.submit(&graph, &exports).await.unwrap_err();
    assert!(!error.is_retryable());
}

#[tokio::test]
async fn invalid_topology_is_rejected_before_any_create() {
    let mut graph = ResourceGraph::new();
    graph
        .insert(ResourceNode::new(name("a"), NodeKind::Role).depends_on(&name("b")))
        .unwrap();
    let engine = RecordingEngine::new();
    let log = engine.created_log();
    let emitter = TopologyEmitter::new(engine);
    assert!(emitter.submit(&graph, &ExportMap::new()).await.is_err());
    assert!(log.entries().is_empty());
}
