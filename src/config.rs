//! Server configuration: TOML file plus command-line overrides.

use crate::cli::Cli;
use crate::presenter::RenderMode;
use crate::protocol::{DISCOVERY_GROUP, DISCOVERY_PORT};
use crate::registry::MAX_ID;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Multicast discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Join the discovery group and answer `NSERV` requests on it.
    enabled: bool,
    /// Multicast group address.
    group: Ipv4Addr,
    /// Multicast port.
    port: u16,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            group: DISCOVERY_GROUP,
            port: DISCOVERY_PORT,
        }
    }
}

/// Configuration for the game server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the game socket to.
    host: IpAddr,

    /// UDP port of the game socket.
    port: u16,

    /// Maximum number of concurrent games (at most 256).
    max_sessions: usize,

    /// How boards are shown.
    render: RenderMode,

    /// Optional file receiving a copy of the log.
    log_file: Option<PathBuf>,

    /// Seed for the random move strategy; OS entropy when absent.
    seed: Option<u64>,

    /// Reject moves whose turn counter disagrees with the session's.
    strict_turns: bool,

    /// Multicast discovery.
    discovery: DiscoveryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 9000,
            max_sessions: MAX_ID,
            render: RenderMode::default(),
            log_file: None,
            seed: None,
            strict_turns: false,
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Resolves the effective configuration: the file named by `--config`
    /// (or defaults), then command-line overrides, then validation.
    #[instrument(skip(cli))]
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Overrides fields with any values given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(host) = cli.host {
            self.host = host;
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(max_sessions) = cli.max_sessions {
            self.max_sessions = max_sessions;
        }
        if let Some(render) = cli.render {
            self.render = render;
        }
        if let Some(log_file) = &cli.log_file {
            self.log_file = Some(log_file.clone());
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
        if cli.strict_turns {
            self.strict_turns = true;
        }
        if cli.discovery {
            self.discovery.enabled = true;
        }
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sessions == 0 || self.max_sessions > MAX_ID {
            return Err(ConfigError::new(format!(
                "max_sessions must be between 1 and {}, got {}",
                MAX_ID, self.max_sessions
            )));
        }
        if !self.discovery.group.is_multicast() {
            return Err(ConfigError::new(format!(
                "discovery group {} is not a multicast address",
                self.discovery.group
            )));
        }
        Ok(())
    }

    /// Address of the game socket.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
