//! Route projection into the managed table

use crate::error::Result;
use crate::netlink::RouteSource;
use crate::types::{AddRouteOutcome, ManagedTable, RouteRecord};
use tracing::{debug, info, warn};

/// What happened to a projected route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Added,
    /// Already in the managed table; counts as success
    AlreadyPresent,
    /// No destination network; nothing was written
    Skipped,
}

/// Copies routes into the managed table
#[derive(Debug, Clone, Copy)]
pub struct RouteProjector {
    table: ManagedTable,
}

impl RouteProjector {
    pub fn new(table: ManagedTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> ManagedTable {
        self.table
    }

    /// Write `route` into the managed table.
    ///
    /// Destination, source, link, inner link, protocol and scope are copied
    /// verbatim. Failures are logged and returned; they are never retried.
    pub async fn project<K: RouteSource + ?Sized>(
        &self,
        route: &RouteRecord,
        kernel: &K,
    ) -> Result<Projection> {
        let Some(destination) = route.destination else {
            debug!(link_index = route.link_index, "Skipping route without destination");
            return Ok(Projection::Skipped);
        };

        let projected = route.with_table(self.table.id());

        match kernel.add_route(&projected).await {
            Ok(AddRouteOutcome::Added) => {
                info!(
                    destination = %destination,
                    link_index = route.link_index,
                    table = self.table.id(),
                    "Added route to managed table"
                );
                Ok(Projection::Added)
            }
            Ok(AddRouteOutcome::AlreadyExists) => {
                debug!(destination = %destination, "Route already in managed table");
                Ok(Projection::AlreadyPresent)
            }
            Err(e) => {
                warn!(destination = %destination, error = %e, "Failed to add route");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockKernel;
    use crate::types::{RT_TABLE_MAIN, RouteDestination};
    use pretty_assertions::assert_eq;
    use std::net::{IpAddr, Ipv4Addr};

    fn route(dst: Option<&str>) -> RouteRecord {
        RouteRecord {
            destination: dst.and_then(RouteDestination::parse),
            source: Some(IpAddr::V4(Ipv4Addr::new(10, 1, 0, 1))),
            link_index: 4,
            inner_link_index: Some(9),
            protocol: 2,
            scope: 253,
            table: RT_TABLE_MAIN,
        }
    }

    fn projector() -> RouteProjector {
        RouteProjector::new(ManagedTable::new(100).unwrap())
    }

    #[tokio::test]
    async fn test_projected_route_only_changes_table() {
        let kernel = MockKernel::new();
        let original = route(Some("10.1.0.0/24"));

        assert_eq!(
            projector().project(&original, &kernel).await.unwrap(),
            Projection::Added
        );
        assert_eq!(kernel.table_routes(100), vec![original.with_table(100)]);
    }

    #[tokio::test]
    async fn test_projection_is_idempotent() {
        let kernel = MockKernel::new();
        let original = route(Some("10.1.0.0/24"));
        let projector = projector();

        projector.project(&original, &kernel).await.unwrap();
        let after_first = kernel.table_routes(100);

        assert_eq!(
            projector.project(&original, &kernel).await.unwrap(),
            Projection::AlreadyPresent
        );
        assert_eq!(kernel.table_routes(100), after_first);
        assert_eq!(after_first.len(), 1);
    }

    #[tokio::test]
    async fn test_no_destination_never_written() {
        let kernel = MockKernel::new();

        assert_eq!(
            projector().project(&route(None), &kernel).await.unwrap(),
            Projection::Skipped
        );
        assert_eq!(kernel.add_calls(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_is_returned() {
        let kernel = MockKernel::new();
        kernel.fail_writes(true);

        assert!(
            projector()
                .project(&route(Some("10.1.0.0/24")), &kernel)
                .await
                .is_err()
        );
        assert!(kernel.table_routes(100).is_empty());
    }
}
