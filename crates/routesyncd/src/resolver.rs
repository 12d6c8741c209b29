//! Bridge membership resolution
//!
//! The kernel announces a new bridge's routes before the container runtime
//! publishes the network, so a miss in the [`BridgeIndex`] is retried: the
//! index is rebuilt from the registry up to `max_attempts` times,
//! `retry_interval` apart. An event still unmatched after that is dropped.

use crate::bridge_index::BridgeIndex;
use crate::config::ResolverConfig;
use crate::registry::NetworkRegistry;
use crate::types::SyncMode;
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of resolving a candidate's interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The interface should be synchronized; `network` is the registry
    /// network name (`None` in all-bridges mode)
    Matched { network: Option<String> },
    /// Not a managed bridge within the retry window; the event is dropped
    Unmatched,
}

impl Resolution {
    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }
}

#[derive(Debug, Clone)]
pub struct BridgeResolver {
    mode: SyncMode,
    max_attempts: u32,
    retry_interval: Duration,
}

impl BridgeResolver {
    pub fn new(mode: SyncMode, config: &ResolverConfig) -> Self {
        Self {
            mode,
            max_attempts: config.max_attempts.max(1),
            retry_interval: config.retry_interval(),
        }
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Decide whether `interface` belongs to a managed bridge.
    ///
    /// May sleep up to `(max_attempts - 1) * retry_interval` in registry-only
    /// mode. Never consults the index in all-bridges mode.
    pub async fn resolve<R: NetworkRegistry + ?Sized>(
        &self,
        interface: &str,
        index: &mut BridgeIndex,
        registry: &R,
    ) -> Resolution {
        if self.mode == SyncMode::AllBridges {
            debug!(interface, "Syncing route change (all bridges)");
            return Resolution::Matched { network: None };
        }

        if let Some(network) = index.get(interface) {
            debug!(interface, network, "Found matching network");
            return Resolution::Matched {
                network: Some(network.to_string()),
            };
        }

        for attempt in 1..=self.max_attempts {
            index.rebuild(registry).await;

            if let Some(network) = index.get(interface) {
                info!(interface, network, attempt, "Found matching network");
                return Resolution::Matched {
                    network: Some(network.to_string()),
                };
            }

            if attempt < self.max_attempts {
                debug!(interface, attempt, "Bridge not yet in registry, retrying");
                tokio::time::sleep(self.retry_interval).await;
            }
        }

        info!(
            interface,
            attempts = self.max_attempts,
            "No matching network for bridge, dropping route event"
        );
        Resolution::Unmatched
    }
}
