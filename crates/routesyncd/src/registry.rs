//! Container network registry
//!
//! The registry is the container runtime's view of which networks exist and
//! which kernel bridge backs each of them. [`DockerRegistry`] reads it from the
//! Docker Engine API over the daemon's unix socket.

use crate::config::RegistryConfig;
use crate::error::{Result, RoutesyncError};
use crate::types::BridgeNetwork;
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::UnixStream;
use tracing::{debug, trace, warn};

/// Length of the network ID prefix used in bridge device names
const BRIDGE_ID_PREFIX_LEN: usize = 12;

/// Docker option marking the built-in `bridge` network
const DEFAULT_BRIDGE_OPTION: &str = "com.docker.network.bridge.default_bridge";

/// Source of container networks
#[async_trait]
pub trait NetworkRegistry: Send + Sync {
    /// All networks currently known to the runtime
    async fn list_networks(&self) -> Result<Vec<BridgeNetwork>>;
}

/// Kernel bridge device name for a network ID ("br-" + 12-char ID prefix)
pub fn bridge_device_name(network_id: &str) -> Option<String> {
    network_id
        .get(..BRIDGE_ID_PREFIX_LEN)
        .map(|prefix| format!("br-{}", prefix))
}

/// Network as returned by `GET /networks`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DockerNetwork {
    name: String,
    id: String,
    driver: String,
    #[serde(default)]
    options: Option<HashMap<String, String>>,
}

impl DockerNetwork {
    fn is_default_bridge(&self) -> bool {
        self.options
            .as_ref()
            .and_then(|opts| opts.get(DEFAULT_BRIDGE_OPTION))
            .is_some_and(|value| value == "true")
    }
}

/// Convert the Docker API listing into registry entries
fn networks_from_docker(networks: Vec<DockerNetwork>) -> Vec<BridgeNetwork> {
    networks
        .into_iter()
        .filter_map(|network| {
            if network.is_default_bridge() {
                debug!(network = %network.name, "Found default docker bridge");
            }
            let Some(bridge_name) = bridge_device_name(&network.id) else {
                warn!(network = %network.name, id = %network.id, "Network ID too short, skipping");
                return None;
            };
            Some(BridgeNetwork {
                bridge_name,
                network_name: network.name,
                driver: network.driver,
            })
        })
        .collect()
}

/// Docker Engine API client over a unix socket
pub struct DockerRegistry {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DockerRegistry {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            socket_path: config.socket_path.clone(),
            timeout: config.request_timeout(),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Performs a GET request and returns the raw body.
    async fn get(&self, path: &str) -> Result<Bytes> {
        tokio::time::timeout(self.timeout, self.request(path))
            .await
            .map_err(|_| {
                RoutesyncError::registry(format!(
                    "request {} timed out after {:?}",
                    path, self.timeout
                ))
            })?
    }

    async fn request(&self, path: &str) -> Result<Bytes> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            RoutesyncError::registry(format!(
                "failed to connect to {}: {}",
                self.socket_path.display(),
                e
            ))
        })?;

        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| RoutesyncError::registry(format!("HTTP handshake failed: {}", e)))?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!("Registry connection closed: {}", e);
            }
        });

        let request = Request::builder()
            .method(Method::GET)
            .uri(format!("http://localhost{}", path))
            .header("Host", "localhost")
            .body(Full::new(Bytes::new()))
            .map_err(|e| RoutesyncError::registry(format!("failed to build request: {}", e)))?;

        let response = sender
            .send_request(request)
            .await
            .map_err(|e| RoutesyncError::registry(format!("request {} failed: {}", path, e)))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| RoutesyncError::registry(format!("failed to read response: {}", e)))?
            .to_bytes();

        if !status.is_success() {
            return Err(RoutesyncError::registry(format!(
                "{} returned {}: {}",
                path,
                status,
                String::from_utf8_lossy(&body).trim()
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl NetworkRegistry for DockerRegistry {
    async fn list_networks(&self) -> Result<Vec<BridgeNetwork>> {
        let body = self.get("/networks").await?;
        let networks: Vec<DockerNetwork> = serde_json::from_slice(&body)
            .map_err(|e| RoutesyncError::registry(format!("invalid network list: {}", e)))?;

        trace!(count = networks.len(), "Listed docker networks");
        Ok(networks_from_docker(networks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NETWORKS_JSON: &str = r#"[
        {
            "Name": "bridge",
            "Id": "f2de39df4171b0dc801e8002d1d999b77256983dfc63041c0f34030aa3977566",
            "Driver": "bridge",
            "Options": {"com.docker.network.bridge.default_bridge": "true"}
        },
        {
            "Name": "web",
            "Id": "abc123def4567890",
            "Driver": "bridge",
            "Options": {}
        },
        {
            "Name": "swarm",
            "Id": "0123456789abcdef",
            "Driver": "overlay",
            "Options": null
        },
        {
            "Name": "broken",
            "Id": "short",
            "Driver": "bridge"
        }
    ]"#;

    #[test]
    fn test_bridge_device_name() {
        assert_eq!(
            bridge_device_name("abc123def4567890").as_deref(),
            Some("br-abc123def456")
        );
        assert_eq!(
            bridge_device_name("abc123def456").as_deref(),
            Some("br-abc123def456")
        );
        assert_eq!(bridge_device_name("abc"), None);
    }

    #[test]
    fn test_networks_from_docker() {
        let networks: Vec<DockerNetwork> = serde_json::from_str(NETWORKS_JSON).unwrap();
        assert!(networks[0].is_default_bridge());
        assert!(!networks[1].is_default_bridge());

        let entries = networks_from_docker(networks);
        assert_eq!(
            entries,
            vec![
                BridgeNetwork {
                    bridge_name: "br-f2de39df4171".into(),
                    network_name: "bridge".into(),
                    driver: "bridge".into(),
                },
                BridgeNetwork {
                    bridge_name: "br-abc123def456".into(),
                    network_name: "web".into(),
                    driver: "bridge".into(),
                },
                BridgeNetwork {
                    bridge_name: "br-0123456789ab".into(),
                    network_name: "swarm".into(),
                    driver: "overlay".into(),
                },
            ]
        );
    }

    /// Serve one canned HTTP response on a unix socket
    async fn serve_once(path: &Path, status: &str, body: &'static str) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::UnixListener::bind(path).unwrap();
        let status = status.to_string();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = stream.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });
    }

    #[tokio::test]
    async fn test_list_networks_over_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docker.sock");
        serve_once(&path, "200 OK", NETWORKS_JSON).await;

        let registry = DockerRegistry::new(&RegistryConfig {
            socket_path: path,
            request_timeout_secs: 5,
        });
        let networks = registry.list_networks().await.unwrap();
        assert_eq!(networks.len(), 3);
        assert_eq!(networks[1].bridge_name, "br-abc123def456");
        assert_eq!(networks[1].network_name, "web");
    }

    #[tokio::test]
    async fn test_error_status_is_registry_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docker.sock");
        serve_once(&path, "500 Internal Server Error", r#"{"message":"boom"}"#).await;

        let registry = DockerRegistry::new(&RegistryConfig {
            socket_path: path,
            request_timeout_secs: 5,
        });
        let err = registry.list_networks().await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_socket_path_from_config() {
        let registry = DockerRegistry::new(&RegistryConfig {
            socket_path: PathBuf::from("/run/podman/podman.sock"),
            request_timeout_secs: 2,
        });
        assert_eq!(registry.socket_path(), Path::new("/run/podman/podman.sock"));
    }

    #[tokio::test]
    async fn test_unreachable_socket_is_registry_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DockerRegistry::new(&RegistryConfig {
            socket_path: dir.path().join("missing.sock"),
            request_timeout_secs: 1,
        });

        let err = registry.list_networks().await.unwrap_err();
        assert!(matches!(err, RoutesyncError::Registry(_)));
    }
}
