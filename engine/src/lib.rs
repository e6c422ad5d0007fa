/*!

This library is the seam between the assembled resource topology and the external world: the
provisioning engine that materializes nodes, the configuration facility that supplies required
keys and secrets, subnet discovery, and local payload files. The topology emitter hands the
validated graph to the engine once, in dependency order, and republishes every produced handle
under a stable export name for sibling stacks.

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

pub use config::{ConfigSource, MemoryConfigSource, Secret};
pub use dns::declare_dns_record;
pub use emitter::{EmittedTopology, ExportMap, TopologyEmitter};
pub use error::{Error, Result};
pub use payload::PayloadFile;
pub use provision::{ProvisionError, ProvisionResult, ProvisioningEngine};
pub use subnet::{StaticSubnets, SubnetDiscovery};

mod config;
mod dns;
mod emitter;
mod error;
mod payload;
mod provision;
mod subnet;
