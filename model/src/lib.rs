/*!

This library provides the resource node and dependency graph model used to
describe one provisioning run: named resource nodes, the partial order between
them, and the handles (ARNs, names, hostnames) each node produces once the
external provisioning engine has materialized it.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use configuration::Configuration;
pub use error::{Error, Result};
pub use graph::ResourceGraph;
pub use handle::{HandleValue, ProducedHandles};
pub use node::{NodeKind, NodeName, ResourceNode};

mod configuration;
mod error;
mod graph;
mod handle;
mod node;
