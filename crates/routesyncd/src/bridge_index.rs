//! Bridge device name -> network name index
//!
//! A cache of registry state. It is only ever replaced wholesale by
//! [`BridgeIndex::rebuild`]; a registry failure leaves it empty rather than
//! stale.

use crate::registry::NetworkRegistry;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Default, Clone)]
pub struct BridgeIndex {
    bridges: HashMap<String, String>,
}

impl BridgeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index with the registry's current bridge networks.
    ///
    /// Returns the number of indexed bridges. An unreachable registry is
    /// logged and yields an empty index.
    pub async fn rebuild<R: NetworkRegistry + ?Sized>(&mut self, registry: &R) -> usize {
        self.bridges = match registry.list_networks().await {
            Ok(networks) => networks
                .into_iter()
                .filter(|network| network.is_bridge_driver())
                .map(|network| (network.bridge_name, network.network_name))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list container networks");
                HashMap::new()
            }
        };

        debug!(bridges = self.bridges.len(), "Rebuilt bridge index");
        self.bridges.len()
    }

    /// Network name for a bridge device
    pub fn get(&self, bridge_name: &str) -> Option<&str> {
        self.bridges.get(bridge_name).map(|s| s.as_str())
    }

    pub fn contains(&self, bridge_name: &str) -> bool {
        self.bridges.contains_key(bridge_name)
    }

    /// Bridge device names in sorted order
    pub fn bridge_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bridges.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRegistry;
    use crate::types::BridgeNetwork;

    fn network(bridge: &str, name: &str, driver: &str) -> BridgeNetwork {
        BridgeNetwork {
            bridge_name: bridge.into(),
            network_name: name.into(),
            driver: driver.into(),
        }
    }

    #[tokio::test]
    async fn test_rebuild_keeps_only_bridge_drivers() {
        let registry = MockRegistry::new();
        registry.add_network(network("br-abc123def456", "web", "bridge"));
        registry.add_network(network("br-0123456789ab", "swarm", "overlay"));

        let mut index = BridgeIndex::new();
        assert_eq!(index.rebuild(&registry).await, 1);
        assert_eq!(index.get("br-abc123def456"), Some("web"));
        assert!(!index.contains("br-0123456789ab"));
    }

    #[tokio::test]
    async fn test_rebuild_replaces_previous_contents() {
        let registry = MockRegistry::new();
        registry.add_network(network("br-abc123def456", "web", "bridge"));

        let mut index = BridgeIndex::new();
        index.rebuild(&registry).await;
        assert!(index.contains("br-abc123def456"));

        registry.remove_network("br-abc123def456");
        registry.add_network(network("br-feed0000beef", "db", "bridge"));
        index.rebuild(&registry).await;

        assert_eq!(index.bridge_names(), vec!["br-feed0000beef".to_string()]);
    }

    #[tokio::test]
    async fn test_unreachable_registry_yields_empty_index() {
        let registry = MockRegistry::new();
        registry.add_network(network("br-abc123def456", "web", "bridge"));

        let mut index = BridgeIndex::new();
        index.rebuild(&registry).await;
        assert_eq!(index.len(), 1);

        registry.set_unreachable(true);
        assert_eq!(index.rebuild(&registry).await, 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_bridge_names_sorted() {
        let mut index = BridgeIndex::new();
        index.bridges.insert("br-b".into(), "b".into());
        index.bridges.insert("br-a".into(), "a".into());
        assert_eq!(index.bridge_names(), vec!["br-a", "br-b"]);
    }
}
