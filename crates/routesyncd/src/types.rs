//! Core types for route synchronization

use crate::error::{Result, RoutesyncError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Kernel main routing table (RT_TABLE_MAIN)
pub const RT_TABLE_MAIN: u32 = 254;

/// Kernel tables that may never be used as the managed table
/// (RT_TABLE_UNSPEC, RT_TABLE_DEFAULT, RT_TABLE_MAIN, RT_TABLE_LOCAL)
const RESERVED_TABLES: [u32; 4] = [0, 253, RT_TABLE_MAIN, 255];

/// Route destination network (address + prefix length)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteDestination {
    pub addr: IpAddr,
    pub prefix_len: u8,
}

impl RouteDestination {
    pub fn new(addr: IpAddr, prefix_len: u8) -> Self {
        Self { addr, prefix_len }
    }

    #[inline]
    pub fn is_ipv4(&self) -> bool {
        self.addr.is_ipv4()
    }

    /// Parse from CIDR notation (e.g., "10.1.0.0/24")
    pub fn parse(s: &str) -> Option<Self> {
        let (addr, len) = s.split_once('/')?;
        let addr: IpAddr = addr.parse().ok()?;
        let prefix_len: u8 = len.parse().ok()?;
        let max = if addr.is_ipv4() { 32 } else { 128 };
        (prefix_len <= max).then_some(Self { addr, prefix_len })
    }
}

impl fmt::Display for RouteDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

/// A kernel route as read from, or written to, a routing table
///
/// Records read from the kernel are never mutated; projection derives a new
/// record through [`RouteRecord::with_table`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Destination network; `None` for default/implicit entries
    pub destination: Option<RouteDestination>,
    /// Preferred source address (RTA_PREFSRC)
    pub source: Option<IpAddr>,
    /// Owning interface (RTA_OIF)
    pub link_index: u32,
    /// Inner/tunnel link (RTA_IIF), if any
    pub inner_link_index: Option<u32>,
    /// Routing protocol tag (RTPROT_*)
    pub protocol: u8,
    /// Route scope (RT_SCOPE_*)
    pub scope: u8,
    /// Routing table the record belongs to
    pub table: u32,
}

impl RouteRecord {
    /// Copy of this record targeting `table`; every other field is verbatim.
    pub fn with_table(&self, table: u32) -> Self {
        Self {
            table,
            ..self.clone()
        }
    }

    /// Whether the destination exists and is IPv4
    pub fn has_ipv4_destination(&self) -> bool {
        self.destination.is_some_and(|dst| dst.is_ipv4())
    }
}

/// Kind of a route-change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEventKind {
    /// RTM_NEWROUTE
    Added,
    /// RTM_DELROUTE
    Removed,
    /// Anything else carrying a route payload
    Other,
}

/// A route-change notification from the kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChangeEvent {
    pub kind: RouteEventKind,
    pub route: RouteRecord,
}

impl RouteChangeEvent {
    pub fn added(route: RouteRecord) -> Self {
        Self {
            kind: RouteEventKind::Added,
            route,
        }
    }

    pub fn removed(route: RouteRecord) -> Self {
        Self {
            kind: RouteEventKind::Removed,
            route,
        }
    }
}

/// Link type from IFLA_INFO_KIND
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    Bridge,
    /// Any other kind; `None` for links without IFLA_LINKINFO (physical NICs)
    Other(Option<String>),
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::Bridge => f.write_str("bridge"),
            LinkKind::Other(Some(kind)) => f.write_str(kind),
            LinkKind::Other(None) => f.write_str("device"),
        }
    }
}

/// Kernel network interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub index: u32,
    pub name: String,
    pub kind: LinkKind,
}

impl LinkInfo {
    #[inline]
    pub fn is_bridge(&self) -> bool {
        self.kind == LinkKind::Bridge
    }
}

/// Network registry entry (one container network)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeNetwork {
    /// Kernel bridge device name (e.g. "br-abc123def456")
    pub bridge_name: String,
    /// Logical network name
    pub network_name: String,
    /// Network driver ("bridge", "overlay", ...)
    pub driver: String,
}

impl BridgeNetwork {
    /// Only bridge-driver networks have a kernel bridge device
    pub fn is_bridge_driver(&self) -> bool {
        self.driver == "bridge"
    }
}

/// Result of a kernel route write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddRouteOutcome {
    Added,
    /// EEXIST: the entry is already in the target table
    AlreadyExists,
}

/// The routing table that receives synchronized routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManagedTable(u32);

impl ManagedTable {
    /// Validate a table ID; reserved kernel tables are rejected.
    pub fn new(id: u32) -> Result<Self> {
        if RESERVED_TABLES.contains(&id) {
            return Err(RoutesyncError::config(format!(
                "route table {} is reserved and cannot be managed",
                id
            )));
        }
        Ok(Self(id))
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ManagedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which bridges are synchronized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Only bridges backing a network known to the registry
    #[default]
    RegistryOnly,
    /// Every bridge-type interface
    AllBridges,
}

impl SyncMode {
    pub fn from_all_bridges(all_bridges: bool) -> Self {
        if all_bridges {
            Self::AllBridges
        } else {
            Self::RegistryOnly
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::RegistryOnly => f.write_str("registry-only"),
            SyncMode::AllBridges => f.write_str("all-bridges"),
        }
    }
}
