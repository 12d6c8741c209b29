//! Kernel route source over rtnetlink
//!
//! [`RouteSource`] is the seam between the synchronization engine and the
//! kernel: route and link lookups, route writes and the live route-change
//! stream. [`KernelRouteSource`] implements it with a request/response
//! netlink socket plus a second socket joined to the IPv4 route multicast
//! group for notifications.

use crate::error::Result;
use crate::types::{AddRouteOutcome, LinkInfo, RouteChangeEvent, RouteRecord};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Kernel routing primitives consumed by the engine
#[async_trait]
pub trait RouteSource: Send + Sync {
    /// Current IPv4 main-table routes whose output interface is `link_index`
    async fn list_routes(&self, link_index: u32) -> Result<Vec<RouteRecord>>;

    /// Resolve a link by its index
    async fn link_by_index(&self, index: u32) -> Result<LinkInfo>;

    /// Resolve a link by its name
    async fn link_by_name(&self, name: &str) -> Result<LinkInfo>;

    /// All links on the host
    async fn list_links(&self) -> Result<Vec<LinkInfo>>;

    /// Write a route; an existing identical entry is reported, not failed
    async fn add_route(&self, route: &RouteRecord) -> Result<AddRouteOutcome>;

    /// Start streaming route-change notifications in arrival order.
    ///
    /// The stream ends when `cancel` fires or the underlying source fails.
    fn subscribe(
        &self,
        cancel: CancellationToken,
        capacity: usize,
    ) -> Result<mpsc::Receiver<RouteChangeEvent>>;
}

#[cfg(target_os = "linux")]
mod linux {
    use super::RouteSource;
    use crate::error::{Result, RoutesyncError};
    use crate::types::{
        AddRouteOutcome, LinkInfo, LinkKind, RT_TABLE_MAIN, RouteChangeEvent, RouteDestination,
        RouteEventKind, RouteRecord,
    };
    use async_trait::async_trait;
    use netlink_packet_core::{
        NLM_F_ACK, NLM_F_CREATE, NLM_F_DUMP, NLM_F_EXCL, NLM_F_REQUEST, NetlinkHeader,
        NetlinkMessage, NetlinkPayload,
    };
    use netlink_packet_route::link::{InfoKind, LinkAttribute, LinkMessage};
    use netlink_packet_route::route::{
        RouteAddress, RouteAttribute, RouteMessage, RouteProtocol, RouteScope, RouteType,
    };
    use netlink_packet_route::{AddressFamily, RouteNetlinkMessage};
    use netlink_sys::{Socket, SocketAddr, protocols::NETLINK_ROUTE};
    use parking_lot::Mutex;
    use std::io;
    use std::net::IpAddr;
    use tokio::io::unix::AsyncFd;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;
    use tracing::{debug, error, instrument, trace, warn};

    /// Multicast group for IPv4 route notifications (RTMGRP_IPV4_ROUTE)
    const RTMGRP_IPV4_ROUTE: u32 = 0x40;

    /// RT_TABLE_UNSPEC; the real table then travels in RTA_TABLE
    const RT_TABLE_UNSPEC: u8 = 0;

    /// Default notification socket receive buffer (1MB)
    const SOCKET_RECV_BUFFER_SIZE: usize = 1024 * 1024;

    /// Blocking request/response socket
    struct RequestSocket {
        socket: Socket,
        sequence: u32,
    }

    impl RequestSocket {
        fn open() -> Result<Self> {
            let mut socket = Socket::new(NETLINK_ROUTE)
                .map_err(|e| RoutesyncError::netlink("create socket", e))?;
            socket
                .bind_auto()
                .map_err(|e| RoutesyncError::netlink("bind socket", e))?;
            socket
                .connect(&SocketAddr::new(0, 0))
                .map_err(|e| RoutesyncError::netlink("connect socket", e))?;
            Ok(Self {
                socket,
                sequence: 0,
            })
        }

        /// Send one request and collect its replies.
        ///
        /// Dumps are read until NLMSG_DONE; other requests until the first
        /// payload or acknowledgement. Kernel errors come back as
        /// `io::Error::from_raw_os_error(errno)`.
        fn request(
            &mut self,
            payload: RouteNetlinkMessage,
            flags: u16,
        ) -> io::Result<Vec<RouteNetlinkMessage>> {
            self.sequence = self.sequence.wrapping_add(1);
            let sequence = self.sequence;

            let mut header = NetlinkHeader::default();
            header.flags = flags;
            header.sequence_number = sequence;
            let mut packet = NetlinkMessage::new(header, NetlinkPayload::InnerMessage(payload));
            packet.finalize();

            let mut buf = vec![0u8; packet.buffer_len()];
            packet.serialize(&mut buf);
            self.socket.send(&buf, 0)?;

            let dump = flags & NLM_F_DUMP == NLM_F_DUMP;
            let mut replies = Vec::new();

            loop {
                let (data, _) = self.socket.recv_from_full()?;
                let mut offset = 0;

                while offset < data.len() {
                    let msg = NetlinkMessage::<RouteNetlinkMessage>::deserialize(&data[offset..])
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

                    let len = msg.header.length as usize;
                    if len == 0 {
                        break;
                    }
                    // Align to 4 bytes (netlink alignment requirement)
                    offset = (offset + len + 3) & !3;

                    if msg.header.sequence_number != sequence {
                        trace!(sequence = msg.header.sequence_number, "Skipping stale reply");
                        continue;
                    }

                    match msg.payload {
                        NetlinkPayload::InnerMessage(inner) => {
                            replies.push(inner);
                            if !dump {
                                return Ok(replies);
                            }
                        }
                        NetlinkPayload::Error(err) => match err.code {
                            None => return Ok(replies),
                            Some(code) => return Err(io::Error::from_raw_os_error(-code.get())),
                        },
                        NetlinkPayload::Done(_) => return Ok(replies),
                        _ => {}
                    }
                }
            }
        }
    }

    /// rtnetlink-backed [`RouteSource`]
    pub struct KernelRouteSource {
        requests: Mutex<RequestSocket>,
        receive_buffer: usize,
    }

    impl KernelRouteSource {
        /// Open the request socket. Requires CAP_NET_ADMIN for writes.
        #[instrument]
        pub fn new() -> Result<Self> {
            let requests = RequestSocket::open()?;
            debug!("Opened rtnetlink request socket");
            Ok(Self {
                requests: Mutex::new(requests),
                receive_buffer: SOCKET_RECV_BUFFER_SIZE,
            })
        }

        /// Receive buffer requested for sockets opened by `subscribe`
        pub fn with_receive_buffer(mut self, bytes: usize) -> Self {
            self.receive_buffer = bytes;
            self
        }

        pub fn receive_buffer(&self) -> usize {
            self.receive_buffer
        }

        /// Blocking round trip on the calling worker thread. Requests only
        /// come from the engine's single event path.
        fn request(
            &self,
            payload: RouteNetlinkMessage,
            flags: u16,
        ) -> io::Result<Vec<RouteNetlinkMessage>> {
            self.requests.lock().request(payload, flags)
        }

        fn get_link(&self, msg: LinkMessage) -> io::Result<Option<LinkInfo>> {
            let replies = self.request(RouteNetlinkMessage::GetLink(msg), NLM_F_REQUEST)?;
            Ok(replies.into_iter().find_map(|reply| match reply {
                RouteNetlinkMessage::NewLink(link) => Some(link_from_message(&link)),
                _ => None,
            }))
        }
    }

    #[async_trait]
    impl RouteSource for KernelRouteSource {
        async fn list_routes(&self, link_index: u32) -> Result<Vec<RouteRecord>> {
            let mut msg = RouteMessage::default();
            msg.header.address_family = AddressFamily::Inet;

            let replies = self
                .request(
                    RouteNetlinkMessage::GetRoute(msg),
                    NLM_F_REQUEST | NLM_F_DUMP,
                )
                .map_err(|e| RoutesyncError::netlink("dump routes", e))?;

            let routes: Vec<RouteRecord> = replies
                .iter()
                .filter_map(|reply| match reply {
                    RouteNetlinkMessage::NewRoute(route) => Some(route_from_message(route)),
                    _ => None,
                })
                .filter(|route| route.link_index == link_index && route.table == RT_TABLE_MAIN)
                .collect();

            trace!(link_index, count = routes.len(), "Listed routes");
            Ok(routes)
        }

        async fn link_by_index(&self, index: u32) -> Result<LinkInfo> {
            let mut msg = LinkMessage::default();
            msg.header.index = index;

            match self.get_link(msg) {
                Ok(Some(link)) => Ok(link),
                Ok(None) => Err(RoutesyncError::InterfaceNotFound(index)),
                Err(e) if e.raw_os_error() == Some(libc::ENODEV) => {
                    Err(RoutesyncError::InterfaceNotFound(index))
                }
                Err(e) => Err(RoutesyncError::netlink("get link", e)),
            }
        }

        async fn link_by_name(&self, name: &str) -> Result<LinkInfo> {
            let mut msg = LinkMessage::default();
            msg.attributes.push(LinkAttribute::IfName(name.to_string()));

            match self.get_link(msg) {
                Ok(Some(link)) => Ok(link),
                Ok(None) => Err(RoutesyncError::LinkNotFound(name.to_string())),
                Err(e) if e.raw_os_error() == Some(libc::ENODEV) => {
                    Err(RoutesyncError::LinkNotFound(name.to_string()))
                }
                Err(e) => Err(RoutesyncError::netlink("get link", e)),
            }
        }

        async fn list_links(&self) -> Result<Vec<LinkInfo>> {
            let replies = self
                .request(
                    RouteNetlinkMessage::GetLink(LinkMessage::default()),
                    NLM_F_REQUEST | NLM_F_DUMP,
                )
                .map_err(|e| RoutesyncError::netlink("dump links", e))?;

            Ok(replies
                .iter()
                .filter_map(|reply| match reply {
                    RouteNetlinkMessage::NewLink(link) => Some(link_from_message(link)),
                    _ => None,
                })
                .collect())
        }

        async fn add_route(&self, route: &RouteRecord) -> Result<AddRouteOutcome> {
            let msg = route_message(route)?;

            match self.request(
                RouteNetlinkMessage::NewRoute(msg),
                NLM_F_REQUEST | NLM_F_ACK | NLM_F_CREATE | NLM_F_EXCL,
            ) {
                Ok(_) => Ok(AddRouteOutcome::Added),
                Err(e) if e.raw_os_error() == Some(libc::EEXIST) => {
                    Ok(AddRouteOutcome::AlreadyExists)
                }
                Err(e) => Err(RoutesyncError::netlink("add route", e)),
            }
        }

        fn subscribe(
            &self,
            cancel: CancellationToken,
            capacity: usize,
        ) -> Result<mpsc::Receiver<RouteChangeEvent>> {
            let mut socket = Socket::new(NETLINK_ROUTE)
                .map_err(|e| RoutesyncError::netlink("create socket", e))?;
            socket
                .bind(&SocketAddr::new(0, RTMGRP_IPV4_ROUTE))
                .map_err(|e| RoutesyncError::netlink("bind socket", e))?;
            socket
                .set_non_blocking(true)
                .map_err(|e| RoutesyncError::netlink("set non-blocking", e))?;
            tune_event_socket(&socket, self.receive_buffer);

            let fd = AsyncFd::new(socket)?;
            let (tx, rx) = mpsc::channel(capacity);
            tokio::spawn(read_events(fd, tx, cancel));

            debug!("Subscribed to RTMGRP_IPV4_ROUTE");
            Ok(rx)
        }
    }

    /// Grow the receive buffer; the engine may stall for seconds on one event.
    /// Failure keeps the kernel default.
    fn tune_event_socket(socket: &Socket, bytes: usize) {
        let size = libc::c_int::try_from(bytes).unwrap_or(libc::c_int::MAX);
        match socket.set_rx_buf_sz(size) {
            Ok(()) => debug!(size = bytes, "Set route event socket receive buffer"),
            Err(e) => warn!(error = %e, "Failed to set SO_RCVBUF, using default buffer size"),
        }
    }

    /// Forward parsed notifications into `tx` until cancelled or the socket fails
    async fn read_events(
        fd: AsyncFd<Socket>,
        tx: mpsc::Sender<RouteChangeEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => break,
                received = recv_datagram(&fd) => received,
            };

            match received {
                Ok(data) => {
                    for event in parse_events(&data) {
                        if tx.send(event).await.is_err() {
                            debug!("Route event receiver dropped");
                            return;
                        }
                    }
                }
                Err(e) if e.raw_os_error() == Some(libc::ENOBUFS) => {
                    warn!("Route event socket overrun, notifications were lost");
                }
                Err(e) => {
                    error!(error = %e, "Route event socket failed");
                    break;
                }
            }
        }
        debug!("Route event reader stopped");
    }

    async fn recv_datagram(fd: &AsyncFd<Socket>) -> io::Result<Vec<u8>> {
        loop {
            let mut guard = fd.readable().await?;
            match guard.try_io(|inner| inner.get_ref().recv_from_full()) {
                Ok(result) => return result.map(|(data, _)| data),
                Err(_would_block) => continue,
            }
        }
    }

    /// Parse one multicast datagram into route events
    fn parse_events(data: &[u8]) -> Vec<RouteChangeEvent> {
        let mut events = Vec::new();
        let mut offset = 0;

        while offset < data.len() {
            let msg = match NetlinkMessage::<RouteNetlinkMessage>::deserialize(&data[offset..]) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!(error = %e, "Failed to parse route notification");
                    break;
                }
            };

            let len = msg.header.length as usize;
            if len == 0 {
                break;
            }
            offset = (offset + len + 3) & !3;

            let (kind, route) = match &msg.payload {
                NetlinkPayload::InnerMessage(RouteNetlinkMessage::NewRoute(r)) => {
                    (RouteEventKind::Added, r)
                }
                NetlinkPayload::InnerMessage(RouteNetlinkMessage::DelRoute(r)) => {
                    (RouteEventKind::Removed, r)
                }
                NetlinkPayload::InnerMessage(RouteNetlinkMessage::GetRoute(r)) => {
                    (RouteEventKind::Other, r)
                }
                _ => continue,
            };

            events.push(RouteChangeEvent {
                kind,
                route: route_from_message(route),
            });
        }

        trace!(count = events.len(), "Received route events");
        events
    }

    fn route_from_message(msg: &RouteMessage) -> RouteRecord {
        let header = &msg.header;
        let mut record = RouteRecord {
            destination: None,
            source: None,
            link_index: 0,
            inner_link_index: None,
            protocol: u8::from(header.protocol),
            scope: u8::from(header.scope),
            table: u32::from(header.table),
        };

        for attr in &msg.attributes {
            match attr {
                RouteAttribute::Destination(addr) => {
                    record.destination = ip_from_route_address(addr)
                        .map(|ip| RouteDestination::new(ip, header.destination_prefix_length));
                }
                RouteAttribute::PrefSource(addr) => record.source = ip_from_route_address(addr),
                RouteAttribute::Oif(index) => record.link_index = *index,
                RouteAttribute::Iif(index) => record.inner_link_index = Some(*index),
                RouteAttribute::Table(table) => record.table = *table,
                _ => {}
            }
        }

        record
    }

    fn route_message(route: &RouteRecord) -> Result<RouteMessage> {
        let destination = route
            .destination
            .ok_or_else(|| RoutesyncError::netlink("add route", "route has no destination"))?;

        let mut msg = RouteMessage::default();
        msg.header.address_family = match destination.addr {
            IpAddr::V4(_) => AddressFamily::Inet,
            IpAddr::V6(_) => AddressFamily::Inet6,
        };
        msg.header.destination_prefix_length = destination.prefix_len;
        msg.header.table = u8::try_from(route.table).unwrap_or(RT_TABLE_UNSPEC);
        msg.header.protocol = RouteProtocol::from(route.protocol);
        msg.header.scope = RouteScope::from(route.scope);
        msg.header.kind = RouteType::Unicast;

        msg.attributes.push(RouteAttribute::Table(route.table));
        msg.attributes
            .push(RouteAttribute::Destination(route_address(destination.addr)));
        if let Some(source) = route.source {
            msg.attributes
                .push(RouteAttribute::PrefSource(route_address(source)));
        }
        msg.attributes.push(RouteAttribute::Oif(route.link_index));
        if let Some(iif) = route.inner_link_index.filter(|&index| index > 0) {
            msg.attributes.push(RouteAttribute::Iif(iif));
        }

        Ok(msg)
    }

    fn ip_from_route_address(addr: &RouteAddress) -> Option<IpAddr> {
        match addr {
            RouteAddress::Inet(v4) => Some(IpAddr::V4(*v4)),
            RouteAddress::Inet6(v6) => Some(IpAddr::V6(*v6)),
            _ => None,
        }
    }

    fn route_address(ip: IpAddr) -> RouteAddress {
        match ip {
            IpAddr::V4(v4) => RouteAddress::Inet(v4),
            IpAddr::V6(v6) => RouteAddress::Inet6(v6),
        }
    }

    fn link_from_message(msg: &LinkMessage) -> LinkInfo {
        let mut name = String::new();
        let mut kind = LinkKind::Other(None);

        for attr in &msg.attributes {
            match attr {
                LinkAttribute::IfName(ifname) => name = ifname.clone(),
                LinkAttribute::LinkInfo(infos) => {
                    for info in infos {
                        if let netlink_packet_route::link::LinkInfo::Kind(info_kind) = info {
                            kind = link_kind(info_kind);
                        }
                    }
                }
                _ => {}
            }
        }

        LinkInfo {
            index: msg.header.index,
            name,
            kind,
        }
    }

    fn link_kind(kind: &InfoKind) -> LinkKind {
        match kind {
            InfoKind::Bridge => LinkKind::Bridge,
            InfoKind::Other(other) => LinkKind::Other(Some(other.clone())),
            other => LinkKind::Other(Some(format!("{:?}", other).to_lowercase())),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::net::Ipv4Addr;

        fn record(table: u32) -> RouteRecord {
            RouteRecord {
                destination: RouteDestination::parse("10.1.0.0/24"),
                source: Some(IpAddr::V4(Ipv4Addr::new(10, 1, 0, 1))),
                link_index: 12,
                inner_link_index: None,
                protocol: 2,
                scope: 253,
                table,
            }
        }

        #[test]
        fn test_route_message_round_trip() {
            let original = record(100);
            let msg = route_message(&original).unwrap();
            assert_eq!(msg.header.table, 100);
            assert_eq!(msg.header.destination_prefix_length, 24);
            assert_eq!(route_from_message(&msg), original);
        }

        #[test]
        fn test_large_table_uses_attribute() {
            let msg = route_message(&record(1000)).unwrap();
            assert_eq!(msg.header.table, RT_TABLE_UNSPEC);
            assert!(msg.attributes.contains(&RouteAttribute::Table(1000)));
            assert_eq!(route_from_message(&msg).table, 1000);
        }

        #[test]
        fn test_route_message_requires_destination() {
            let mut route = record(100);
            route.destination = None;
            assert!(route_message(&route).is_err());
        }

        #[test]
        fn test_inner_link_carried() {
            let mut route = record(100);
            route.inner_link_index = Some(3);
            let msg = route_message(&route).unwrap();
            assert!(msg.attributes.contains(&RouteAttribute::Iif(3)));
        }

        #[test]
        fn test_link_from_message() {
            let mut msg = LinkMessage::default();
            msg.header.index = 7;
            msg.attributes
                .push(LinkAttribute::IfName("br-abc123def456".to_string()));
            msg.attributes.push(LinkAttribute::LinkInfo(vec![
                netlink_packet_route::link::LinkInfo::Kind(InfoKind::Bridge),
            ]));

            let link = link_from_message(&msg);
            assert_eq!(link.index, 7);
            assert_eq!(link.name, "br-abc123def456");
            assert!(link.is_bridge());
        }

        /// Serialize `messages` back to back as one multicast datagram
        fn datagram(messages: Vec<RouteNetlinkMessage>) -> Vec<u8> {
            let mut data = Vec::new();
            for inner in messages {
                let mut packet =
                    NetlinkMessage::new(NetlinkHeader::default(), NetlinkPayload::InnerMessage(inner));
                packet.finalize();
                let start = data.len();
                data.resize(start + packet.buffer_len(), 0);
                packet.serialize(&mut data[start..]);
                data.resize((data.len() + 3) & !3, 0);
            }
            data
        }

        #[test]
        fn test_parse_events_maps_kinds_in_order() {
            let main = record(RT_TABLE_MAIN);
            let mut large = record(1000);
            large.destination = RouteDestination::parse("10.2.0.0/16");

            let data = datagram(vec![
                RouteNetlinkMessage::NewRoute(route_message(&main).unwrap()),
                RouteNetlinkMessage::NewLink(LinkMessage::default()),
                RouteNetlinkMessage::DelRoute(route_message(&main).unwrap()),
                RouteNetlinkMessage::NewRoute(route_message(&large).unwrap()),
            ]);

            let events = parse_events(&data);
            assert_eq!(
                events,
                vec![
                    RouteChangeEvent::added(main.clone()),
                    RouteChangeEvent::removed(main),
                    RouteChangeEvent::added(large),
                ]
            );
            assert_eq!(events[2].route.table, 1000);
        }

        #[test]
        fn test_parse_events_keeps_events_before_truncation() {
            let main = record(RT_TABLE_MAIN);
            let mut data = datagram(vec![RouteNetlinkMessage::NewRoute(
                route_message(&main).unwrap(),
            )]);
            data.extend_from_slice(&[0xff; 6]);

            assert_eq!(parse_events(&data), vec![RouteChangeEvent::added(main)]);
        }

        #[test]
        fn test_event_socket_receive_buffer() {
            let socket = Socket::new(NETLINK_ROUTE).unwrap();
            tune_event_socket(&socket, 64 * 1024);
            assert!(socket.get_rx_buf_sz().unwrap() >= 64 * 1024);
        }

        #[tokio::test]
        async fn test_loopback_lookups() {
            let kernel = KernelRouteSource::new().unwrap();
            assert_eq!(kernel.receive_buffer(), SOCKET_RECV_BUFFER_SIZE);

            let lo = kernel.link_by_name("lo").await.unwrap();
            assert_eq!(lo.name, "lo");
            assert!(!lo.is_bridge());
            assert_eq!(kernel.link_by_index(lo.index).await.unwrap().name, "lo");
            assert!(
                kernel
                    .list_links()
                    .await
                    .unwrap()
                    .iter()
                    .any(|link| link.index == lo.index)
            );
        }

        #[tokio::test]
        async fn test_missing_link_is_not_found() {
            let kernel = KernelRouteSource::new().unwrap().with_receive_buffer(4096);
            assert_eq!(kernel.receive_buffer(), 4096);

            let err = kernel.link_by_name("rsd-missing0").await.unwrap_err();
            assert!(matches!(err, RoutesyncError::LinkNotFound(name) if name == "rsd-missing0"));
        }

        #[test]
        fn test_link_without_info_is_not_bridge() {
            let mut msg = LinkMessage::default();
            msg.attributes.push(LinkAttribute::IfName("eth0".to_string()));
            let link = link_from_message(&msg);
            assert_eq!(link.kind, LinkKind::Other(None));
        }
    }
}

#[cfg(target_os = "linux")]
pub use linux::KernelRouteSource;

/// Stub for non-Linux platforms (development only)
#[cfg(not(target_os = "linux"))]
mod unsupported {
    use super::RouteSource;
    use crate::error::{Result, RoutesyncError};
    use crate::types::{AddRouteOutcome, LinkInfo, RouteChangeEvent, RouteRecord};
    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    fn unsupported<T>() -> Result<T> {
        Err(RoutesyncError::netlink(
            "open",
            "rtnetlink is only available on Linux",
        ))
    }

    pub struct KernelRouteSource;

    impl KernelRouteSource {
        pub fn new() -> Result<Self> {
            unsupported()
        }

        pub fn with_receive_buffer(self, _bytes: usize) -> Self {
            self
        }

        pub fn receive_buffer(&self) -> usize {
            0
        }
    }

    #[async_trait]
    impl RouteSource for KernelRouteSource {
        async fn list_routes(&self, _link_index: u32) -> Result<Vec<RouteRecord>> {
            unsupported()
        }

        async fn link_by_index(&self, _index: u32) -> Result<LinkInfo> {
            unsupported()
        }

        async fn link_by_name(&self, _name: &str) -> Result<LinkInfo> {
            unsupported()
        }

        async fn list_links(&self) -> Result<Vec<LinkInfo>> {
            unsupported()
        }

        async fn add_route(&self, _route: &RouteRecord) -> Result<AddRouteOutcome> {
            unsupported()
        }

        fn subscribe(
            &self,
            _cancel: CancellationToken,
            _capacity: usize,
        ) -> Result<mpsc::Receiver<RouteChangeEvent>> {
            unsupported()
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub use unsupported::KernelRouteSource;
