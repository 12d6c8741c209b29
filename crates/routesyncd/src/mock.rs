//! In-memory kernel and registry
//!
//! Used by the test suites and for exercising the engine without
//! CAP_NET_ADMIN or a container runtime. Both types are cheap to clone and
//! share state between clones, so a test can keep a handle while the engine
//! owns another.

use crate::error::{Result, RoutesyncError};
use crate::netlink::RouteSource;
use crate::registry::NetworkRegistry;
use crate::types::{
    AddRouteOutcome, BridgeNetwork, LinkInfo, LinkKind, RT_TABLE_MAIN, RouteChangeEvent,
    RouteRecord,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Buffer for events injected before the engine subscribes
const MOCK_EVENT_BUFFER: usize = 256;

#[derive(Debug)]
struct KernelState {
    links: BTreeMap<u32, LinkInfo>,
    routes: Vec<RouteRecord>,
    add_calls: usize,
    link_lookups: usize,
    fail_writes: bool,
    events_tx: Option<mpsc::Sender<RouteChangeEvent>>,
    events_rx: Option<mpsc::Receiver<RouteChangeEvent>>,
}

/// In-memory [`RouteSource`]
///
/// Routes are unique per (table, destination), like kernel unicast routes
/// without metrics.
#[derive(Debug, Clone)]
pub struct MockKernel {
    state: Arc<Mutex<KernelState>>,
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockKernel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(MOCK_EVENT_BUFFER);
        Self {
            state: Arc::new(Mutex::new(KernelState {
                links: BTreeMap::new(),
                routes: Vec::new(),
                add_calls: 0,
                link_lookups: 0,
                fail_writes: false,
                events_tx: Some(tx),
                events_rx: Some(rx),
            })),
        }
    }

    pub fn add_link(&self, index: u32, name: &str, kind: LinkKind) {
        self.state.lock().links.insert(
            index,
            LinkInfo {
                index,
                name: name.to_string(),
                kind,
            },
        );
    }

    /// Insert a route directly, bypassing the write counter
    pub fn insert_route(&self, route: RouteRecord) {
        self.state.lock().routes.push(route);
    }

    /// Routes currently in `table`
    pub fn table_routes(&self, table: u32) -> Vec<RouteRecord> {
        self.state
            .lock()
            .routes
            .iter()
            .filter(|route| route.table == table)
            .cloned()
            .collect()
    }

    /// Number of `add_route` calls that reached the kernel
    pub fn add_calls(&self) -> usize {
        self.state.lock().add_calls
    }

    pub fn link_lookups(&self) -> usize {
        self.state.lock().link_lookups
    }

    /// Make every subsequent `add_route` fail
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Inject a route notification
    pub async fn send_event(&self, event: RouteChangeEvent) {
        let tx = self.state.lock().events_tx.clone();
        if let Some(tx) = tx {
            let _ = tx.send(event).await;
        }
    }

    /// Close the notification stream as a failing socket would
    pub fn close_events(&self) {
        self.state.lock().events_tx = None;
    }

    fn lookup(&self, predicate: impl Fn(&LinkInfo) -> bool) -> Option<LinkInfo> {
        let mut state = self.state.lock();
        state.link_lookups += 1;
        state.links.values().find(|&link| predicate(link)).cloned()
    }
}

#[async_trait]
impl RouteSource for MockKernel {
    async fn list_routes(&self, link_index: u32) -> Result<Vec<RouteRecord>> {
        let state = self.state.lock();
        if !state.links.contains_key(&link_index) {
            return Err(RoutesyncError::InterfaceNotFound(link_index));
        }
        Ok(state
            .routes
            .iter()
            .filter(|route| {
                route.link_index == link_index
                    && route.table == RT_TABLE_MAIN
                    && route.destination.is_none_or(|dst| dst.is_ipv4())
            })
            .cloned()
            .collect())
    }

    async fn link_by_index(&self, index: u32) -> Result<LinkInfo> {
        self.lookup(|link| link.index == index)
            .ok_or(RoutesyncError::InterfaceNotFound(index))
    }

    async fn link_by_name(&self, name: &str) -> Result<LinkInfo> {
        self.lookup(|link| link.name == name)
            .ok_or_else(|| RoutesyncError::LinkNotFound(name.to_string()))
    }

    async fn list_links(&self) -> Result<Vec<LinkInfo>> {
        Ok(self.state.lock().links.values().cloned().collect())
    }

    async fn add_route(&self, route: &RouteRecord) -> Result<AddRouteOutcome> {
        let mut state = self.state.lock();
        state.add_calls += 1;

        if state.fail_writes {
            return Err(RoutesyncError::netlink("add route", "Network is unreachable"));
        }

        let exists = state
            .routes
            .iter()
            .any(|r| r.table == route.table && r.destination == route.destination);
        if exists {
            return Ok(AddRouteOutcome::AlreadyExists);
        }

        state.routes.push(route.clone());
        Ok(AddRouteOutcome::Added)
    }

    fn subscribe(
        &self,
        cancel: CancellationToken,
        capacity: usize,
    ) -> Result<mpsc::Receiver<RouteChangeEvent>> {
        let mut source = self
            .state
            .lock()
            .events_rx
            .take()
            .ok_or_else(|| RoutesyncError::netlink("subscribe", "already subscribed"))?;

        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = source.recv() => event,
                };
                match event {
                    Some(event) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        });
        Ok(rx)
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    /// (network, first call on which it is visible)
    networks: Vec<(BridgeNetwork, usize)>,
    unreachable: bool,
    calls: Vec<Instant>,
}

/// In-memory [`NetworkRegistry`] with scripted visibility
#[derive(Debug, Clone, Default)]
pub struct MockRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_network(&self, network: BridgeNetwork) {
        self.add_network_after(network, 0);
    }

    /// Make `network` visible starting with the `call`-th listing (1-based)
    pub fn add_network_after(&self, network: BridgeNetwork, call: usize) {
        self.state.lock().networks.push((network, call));
    }

    pub fn remove_network(&self, bridge_name: &str) {
        self.state
            .lock()
            .networks
            .retain(|(network, _)| network.bridge_name != bridge_name);
    }

    /// Simulate the container runtime being down
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Time of every listing, in call order
    pub fn call_times(&self) -> Vec<Instant> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl NetworkRegistry for MockRegistry {
    async fn list_networks(&self) -> Result<Vec<BridgeNetwork>> {
        let mut state = self.state.lock();
        state.calls.push(Instant::now());
        let call = state.calls.len();

        if state.unreachable {
            return Err(RoutesyncError::registry("connection refused"));
        }

        Ok(state
            .networks
            .iter()
            .filter(|(_, visible_from)| call >= *visible_from)
            .map(|(network, _)| network.clone())
            .collect())
    }
}
