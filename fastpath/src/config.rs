use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use clap::Parser;
use ipnet::Ipv4Net;
use serde::Deserialize;

/// One attached interface: a stable index plus the MAC stamped as the
/// source address on frames redirected out of it.
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceConfig {
    pub id: u32,
    pub name: String,
    pub mac: String,
}

/// A route entry. `interface` refers to an entry in `interfaces` by name
/// and is resolved to its index during provisioning. A missing gateway
/// means the destination network is directly connected.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub destination: Ipv4Net,
    pub interface: String,
    #[serde(default)]
    pub gateway: Option<Ipv4Addr>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NeighborConfig {
    pub ip: Ipv4Addr,
    pub mac: String,
}

/// Application configuration, loadable from CLI or YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    #[serde(default)]
    pub neighbors: Vec<NeighborConfig>,

    /// Addresses owned by the local stack; matching frames are passed up.
    #[serde(default)]
    pub local_addresses: Vec<Ipv4Addr>,

    /// Default log filter when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Quiet mode (suppress non-error logs).
    #[serde(default)]
    pub quiet: bool,

    /// Frame source: a file of hex-encoded frames, or "-" for stdin.
    #[serde(default)]
    pub frames: Option<String>,

    /// Seconds between periodic counter reports while streaming.
    #[serde(default = "default_stats_interval")]
    pub stats_interval_seconds: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_stats_interval() -> u64 {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interfaces: Vec::new(),
            routes: Vec::new(),
            neighbors: Vec::new(),
            local_addresses: Vec::new(),
            log_level: default_log_level(),
            quiet: false,
            frames: None,
            stats_interval_seconds: default_stats_interval(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Merge CLI args into config (CLI takes precedence).
    pub fn merge_cli(&mut self, cli: &CliArgs) {
        if cli.frames.is_some() {
            self.frames = cli.frames.clone();
        }
        if cli.quiet {
            self.quiet = true;
        }
        if cli.stats_interval != 3 {
            self.stats_interval_seconds = cli.stats_interval;
        }
    }
}

/// fastpath: config-driven IPv4 forwarding engine with a frame replay driver
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Path to YAML config file.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Frame source: a file of hex-encoded frames (one per line), or "-"
    /// for stdin.
    #[arg(short, long)]
    pub frames: Option<String>,

    /// Quiet mode (suppress non-error logs).
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Seconds between periodic counter reports while streaming.
    #[arg(long, default_value_t = 3)]
    pub stats_interval: u64,

    /// Print the final counters as JSON on stdout.
    #[arg(long)]
    pub stats_json: bool,
}
