//! Route synchronization engine
//!
//! Owns the bridge index and the managed table for the lifetime of the
//! process and drives one lifecycle:
//!
//! ```text
//! Bootstrapping ──▶ Listening ──▶ Draining ──▶ Stopped
//! ```
//!
//! Bootstrapping copies the current routes of every known bridge into the
//! managed table. Listening consumes kernel route notifications one at a time,
//! each running classifier, resolver and projector to completion before the
//! next is read. A cancellation observed while an event is being resolved is
//! honoured once that event is done.

use crate::bridge_index::BridgeIndex;
use crate::classifier::{Classification, classify};
use crate::config::{ResolverConfig, RoutesyncConfig};
use crate::error::{Result, RoutesyncError};
use crate::netlink::RouteSource;
use crate::projector::{Projection, RouteProjector};
use crate::registry::NetworkRegistry;
use crate::resolver::{BridgeResolver, Resolution};
use crate::types::{LinkInfo, ManagedTable, RouteChangeEvent, RouteRecord, SyncMode};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Bootstrapping,
    Listening,
    Draining,
    Stopped,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineState::Bootstrapping => "bootstrapping",
            EngineState::Listening => "listening",
            EngineState::Draining => "draining",
            EngineState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Counters over the whole lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Routes newly written to the managed table
    pub projected: u64,
    /// Routes the managed table already held
    pub already_present: u64,
    /// Routes without a destination network
    pub skipped: u64,
    pub write_failures: u64,
    /// Events rejected by the classifier
    pub ignored: u64,
    /// Candidates whose bridge never showed up in the registry
    pub unmatched: u64,
}

/// Everything the engine needs besides its collaborators
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub table: ManagedTable,
    pub mode: SyncMode,
    pub resolver: ResolverConfig,
    pub channel_capacity: usize,
}

impl EngineOptions {
    /// Options with default resolver and channel tuning
    pub fn new(table: ManagedTable, mode: SyncMode) -> Self {
        Self::from_config(table, mode, &RoutesyncConfig::default())
    }

    pub fn from_config(table: ManagedTable, mode: SyncMode, config: &RoutesyncConfig) -> Self {
        Self {
            table,
            mode,
            resolver: config.resolver.clone(),
            channel_capacity: config.events.channel_capacity,
        }
    }
}

/// Keeps the managed table in sync with bridge routes in the main table
pub struct RouteSyncEngine<K, R> {
    kernel: K,
    registry: R,
    index: BridgeIndex,
    resolver: BridgeResolver,
    projector: RouteProjector,
    channel_capacity: usize,
    state: EngineState,
    stats: SyncStats,
}

impl<K: RouteSource, R: NetworkRegistry> RouteSyncEngine<K, R> {
    pub fn new(kernel: K, registry: R, options: EngineOptions) -> Self {
        Self {
            kernel,
            registry,
            index: BridgeIndex::new(),
            resolver: BridgeResolver::new(options.mode, &options.resolver),
            projector: RouteProjector::new(options.table),
            channel_capacity: options.channel_capacity.max(1),
            state: EngineState::Bootstrapping,
            stats: SyncStats::default(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    pub fn table(&self) -> ManagedTable {
        self.projector.table()
    }

    pub fn mode(&self) -> SyncMode {
        self.resolver.mode()
    }

    /// Current bridge index (empty in all-bridges mode)
    pub fn bridge_index(&self) -> &BridgeIndex {
        &self.index
    }

    /// Run the whole lifecycle until `cancel` fires.
    ///
    /// Returns `Ok` only when stopped by `cancel`. If the kernel stream ends
    /// on its own the engine still drains and stops, then reports
    /// [`RoutesyncError::SubscriptionClosed`].
    #[instrument(skip_all, fields(table = %self.projector.table(), mode = %self.resolver.mode()))]
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        self.bootstrap().await;

        let subscription = cancel.child_token();
        let mut events = match self
            .kernel
            .subscribe(subscription.clone(), self.channel_capacity)
        {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "Failed to subscribe to route changes");
                self.transition(EngineState::Stopped);
                return Err(e);
            }
        };
        info!("Listening for route changes");

        let cancelled = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break true,
                event = events.recv() => match event {
                    Some(event) => self.handle_event(&event).await,
                    None => break false,
                },
            }
        };

        self.transition(EngineState::Draining);
        subscription.cancel();
        events.close();
        self.transition(EngineState::Stopped);
        self.log_summary("Route sync stopped");

        if cancelled {
            Ok(())
        } else {
            warn!("Route event stream closed without a shutdown request");
            Err(RoutesyncError::SubscriptionClosed)
        }
    }

    /// Copy the current routes of every known bridge into the managed table.
    ///
    /// Failures for one bridge or route are logged and skipped. Always ends
    /// in [`EngineState::Listening`].
    #[instrument(skip_all)]
    pub async fn bootstrap(&mut self) {
        let bridges = self.bootstrap_bridges().await;
        info!(bridges = bridges.len(), "Copying existing bridge routes");

        for bridge in bridges {
            let routes = match self.kernel.list_routes(bridge.index).await {
                Ok(routes) => routes,
                Err(e) => {
                    warn!(interface = %bridge.name, error = %e, "Failed to list bridge routes");
                    continue;
                }
            };

            debug!(interface = %bridge.name, routes = routes.len(), "Syncing bridge routes");
            for route in &routes {
                self.project(route).await;
            }
        }

        self.log_summary("Initial route sync complete");
        self.transition(EngineState::Listening);
    }

    async fn bootstrap_bridges(&mut self) -> Vec<LinkInfo> {
        match self.resolver.mode() {
            SyncMode::AllBridges => match self.kernel.list_links().await {
                Ok(links) => links.into_iter().filter(LinkInfo::is_bridge).collect(),
                Err(e) => {
                    warn!(error = %e, "Failed to list links");
                    Vec::new()
                }
            },
            SyncMode::RegistryOnly => {
                self.index.rebuild(&self.registry).await;

                let mut bridges = Vec::with_capacity(self.index.len());
                for name in self.index.bridge_names() {
                    match self.kernel.link_by_name(&name).await {
                        Ok(link) => bridges.push(link),
                        Err(e) => {
                            warn!(interface = %name, error = %e, "Registry bridge not found in kernel");
                        }
                    }
                }
                bridges
            }
        }
    }

    /// Classify, resolve and project a single kernel notification
    pub async fn handle_event(&mut self, event: &RouteChangeEvent) {
        let candidate = match classify(event, &self.kernel).await {
            Classification::Candidate(candidate) => candidate,
            Classification::Ignore(reason) => {
                debug!(%reason, "Ignoring route event");
                self.stats.ignored += 1;
                return;
            }
        };

        let resolution = self
            .resolver
            .resolve(&candidate.interface, &mut self.index, &self.registry)
            .await;

        match resolution {
            Resolution::Matched { network } => {
                debug!(
                    interface = %candidate.interface,
                    network = network.as_deref().unwrap_or("-"),
                    "Syncing route change"
                );
                self.project(&candidate.route).await;
            }
            Resolution::Unmatched => self.stats.unmatched += 1,
        }
    }

    async fn project(&mut self, route: &RouteRecord) {
        let outcome = self.projector.project(route, &self.kernel).await;
        match outcome {
            Ok(Projection::Added) => self.stats.projected += 1,
            Ok(Projection::AlreadyPresent) => self.stats.already_present += 1,
            Ok(Projection::Skipped) => self.stats.skipped += 1,
            Err(_) => self.stats.write_failures += 1,
        }
    }

    fn transition(&mut self, next: EngineState) {
        info!(from = %self.state, to = %next, "Engine state change");
        self.state = next;
    }

    fn log_summary(&self, message: &str) {
        let stats = &self.stats;
        info!(
            projected = stats.projected,
            already_present = stats.already_present,
            skipped = stats.skipped,
            write_failures = stats.write_failures,
            ignored = stats.ignored,
            unmatched = stats.unmatched,
            "{}",
            message
        );
    }
}
