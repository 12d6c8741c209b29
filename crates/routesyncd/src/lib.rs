//! Route Synchronization Daemon
//!
//! Keeps a managed kernel routing table in step with the routes of container
//! bridge networks, so container subnets can be reached through a separate,
//! policy-controlled table while the main table stays authoritative for host
//! routing.
//!
//! # NIST 800-53 Rev 5 Control Mappings
//!
//! | Control | Description | Implementation |
//! |---------|-------------|----------------|
//! | AC-3 | Access Enforcement | Kernel route writes require CAP_NET_ADMIN |
//! | AU-3 | Content of Audit Records | Structured logging of every projected route |
//! | CM-6 | Configuration Settings | Managed table and mode from CLI, tuning from TOML |
//! | SC-7 | Boundary Protection | Only bridge routes from the main table are mirrored |
//! | SI-4 | System Monitoring | Real-time route change monitoring |
//! | SI-11 | Error Handling | Structured error types |
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────────────────────┐
//! │  Linux Kernel   │     │            routesyncd            │
//! │                 │     │                                  │
//! │  main table     │────▶│  KernelRouteSource::subscribe    │
//! │  RTM_NEWROUTE   │     │            │                     │
//! │                 │     │            ▼                     │
//! │                 │     │  classifier ──▶ resolver ◀───────┼──── Docker
//! │                 │     │                    │   (BridgeIndex)    /networks
//! │  managed table  │◀────│  projector ◀───────┘             │
//! │                 │     │                                  │
//! └─────────────────┘     └──────────────────────────────────┘
//! ```

pub mod bridge_index;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod mock;
pub mod netlink;
pub mod projector;
pub mod registry;
pub mod resolver;
pub mod types;

pub use bridge_index::BridgeIndex;
pub use classifier::{Candidate, Classification, IgnoreReason, classify, prefilter};
pub use config::{EventConfig, RegistryConfig, ResolverConfig, RoutesyncConfig};
pub use engine::{EngineOptions, EngineState, RouteSyncEngine, SyncStats};
pub use error::{Result, RoutesyncError};
pub use netlink::{KernelRouteSource, RouteSource};
pub use projector::{Projection, RouteProjector};
pub use registry::{DockerRegistry, NetworkRegistry, bridge_device_name};
pub use resolver::{BridgeResolver, Resolution};
pub use types::{
    AddRouteOutcome, BridgeNetwork, LinkInfo, LinkKind, ManagedTable, RT_TABLE_MAIN,
    RouteChangeEvent, RouteDestination, RouteEventKind, RouteRecord, SyncMode,
};
