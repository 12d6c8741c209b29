//! Route event classification
//!
//! Decides whether a kernel notification is a candidate for synchronization.
//! Rules apply in order and the first failing rule wins:
//!
//! 1. the event must be a route addition;
//! 2. the destination must be IPv4;
//! 3. the route must come from the main table (our own writes to the managed
//!    table come back as notifications and must not loop);
//! 4. the owning interface must resolve to a bridge.
//!
//! Removals are never acted on; the kernel drops routes from every table
//! when their interface goes away.

use crate::netlink::RouteSource;
use crate::types::{RT_TABLE_MAIN, RouteChangeEvent, RouteEventKind, RouteRecord};
use std::fmt;
use tracing::trace;

/// Why an event was ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    NotAdded(RouteEventKind),
    /// Missing or non-IPv4 destination
    NotIpv4,
    NotMainTable(u32),
    LinkUnresolved(u32),
    NotBridge { interface: String, kind: String },
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NotAdded(kind) => write!(f, "route not being added ({:?})", kind),
            IgnoreReason::NotIpv4 => f.write_str("destination is not IPv4"),
            IgnoreReason::NotMainTable(table) => write!(f, "route is in table {}", table),
            IgnoreReason::LinkUnresolved(index) => write!(f, "link {} not resolvable", index),
            IgnoreReason::NotBridge { interface, kind } => {
                write!(f, "interface {} is a {}, not a bridge", interface, kind)
            }
        }
    }
}

/// An event that passed every filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub route: RouteRecord,
    /// Name of the bridge owning the route
    pub interface: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Candidate(Candidate),
    Ignore(IgnoreReason),
}

impl Classification {
    pub fn is_candidate(&self) -> bool {
        matches!(self, Classification::Candidate(_))
    }
}

/// Rules 1-3: decided from the event alone
pub fn prefilter(event: &RouteChangeEvent) -> Option<IgnoreReason> {
    if event.kind != RouteEventKind::Added {
        return Some(IgnoreReason::NotAdded(event.kind));
    }
    if !event.route.has_ipv4_destination() {
        return Some(IgnoreReason::NotIpv4);
    }
    if event.route.table != RT_TABLE_MAIN {
        return Some(IgnoreReason::NotMainTable(event.route.table));
    }
    None
}

/// Classify an event, resolving its owning link for rule 4.
///
/// The only interaction with `links` is a read-only link lookup.
pub async fn classify<K: RouteSource + ?Sized>(
    event: &RouteChangeEvent,
    links: &K,
) -> Classification {
    if let Some(reason) = prefilter(event) {
        trace!(%reason, "Ignoring route event");
        return Classification::Ignore(reason);
    }

    let link = match links.link_by_index(event.route.link_index).await {
        Ok(link) => link,
        Err(e) => {
            trace!(error = %e, "Ignoring route event on unresolvable link");
            return Classification::Ignore(IgnoreReason::LinkUnresolved(event.route.link_index));
        }
    };

    if !link.is_bridge() {
        return Classification::Ignore(IgnoreReason::NotBridge {
            kind: link.kind.to_string(),
            interface: link.name,
        });
    }

    Classification::Candidate(Candidate {
        route: event.route.clone(),
        interface: link.name,
    })
}
