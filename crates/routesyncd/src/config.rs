//! Configuration file support for routesyncd
//!
//! Loads and validates optional tuning from a TOML file. The managed table
//! and sync mode always come from the command line.

use crate::error::{Result, RoutesyncError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Network registry (Docker Engine API) configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Docker Engine unix socket
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Bridge resolver retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Number of registry rebuilds before an event is dropped
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between rebuilds in milliseconds
    #[serde(default = "default_retry_interval")]
    pub retry_interval_ms: u64,
}

/// Kernel event stream configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Capacity of the channel between the netlink reader and the engine
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// SO_RCVBUF requested for the route notification socket
    #[serde(default = "default_receive_buffer")]
    pub receive_buffer_bytes: usize,
}

/// Complete routesyncd configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutesyncConfig {
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub events: EventConfig,
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/var/run/docker.sock")
}

fn default_request_timeout() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    10
}

fn default_retry_interval() -> u64 {
    1000
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_receive_buffer() -> usize {
    1024 * 1024
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl RegistryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_interval_ms: default_retry_interval(),
        }
    }
}

impl ResolverConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            receive_buffer_bytes: default_receive_buffer(),
        }
    }
}

impl RoutesyncConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            RoutesyncError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| RoutesyncError::config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolver.max_attempts == 0 {
            return Err(RoutesyncError::config(
                "resolver.max_attempts must be at least 1",
            ));
        }
        if self.registry.request_timeout_secs == 0 {
            return Err(RoutesyncError::config(
                "registry.request_timeout_secs must be greater than 0",
            ));
        }
        if self.events.channel_capacity == 0 {
            return Err(RoutesyncError::config(
                "events.channel_capacity must be greater than 0",
            ));
        }
        if self.events.receive_buffer_bytes == 0 {
            return Err(RoutesyncError::config(
                "events.receive_buffer_bytes must be greater than 0",
            ));
        }
        Ok(())
    }
}
