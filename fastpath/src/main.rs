use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fastpath_core::{CounterBank, Forwarder, MacAddr, NextHop, SharedTables};

mod config;
mod replay;

use config::{CliArgs, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();

    // Load config from file if provided, otherwise use defaults.
    let mut config = if let Some(ref config_path) = cli.config {
        Config::from_file(Path::new(config_path))
            .with_context(|| format!("loading config {config_path:?}"))?
    } else {
        Config::default()
    };
    config.merge_cli(&cli);

    // Logging.
    if config.quiet {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new("error"))
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
            ))
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // ── Tables & provisioning ─────────────────────────────────────────
    let tables = Arc::new(SharedTables::new());
    provision(&tables, &config)?;
    info!(
        routes = tables.routes().len(),
        interfaces = tables.interfaces().len(),
        neighbors = tables.neighbors().len(),
        local_addresses = tables.local_address_count(),
        "control plane provisioned"
    );

    // ── Pipeline & replay driver ──────────────────────────────────────
    let counters = Arc::new(CounterBank::new());
    let forwarder = Forwarder::new(tables, counters.clone());

    replay::run(
        &forwarder,
        &counters,
        config.frames.as_deref(),
        Duration::from_secs(config.stats_interval_seconds),
        cli.stats_json,
    )
    .await?;

    Ok(())
}

/// Install the configured interfaces, routes, neighbors, and local
/// addresses into the shared tables, resolving route interface names to
/// their indexes along the way.
fn provision(tables: &SharedTables, config: &Config) -> anyhow::Result<()> {
    let mut ifindex_by_name: HashMap<&str, u32> = HashMap::new();

    for iface in &config.interfaces {
        let mac: MacAddr = iface
            .mac
            .parse()
            .with_context(|| format!("interface {}", iface.name))?;
        tables.interfaces().set(iface.id, mac);
        ifindex_by_name.insert(&iface.name, iface.id);
        info!(name = %iface.name, id = iface.id, mac = %mac, "registered interface");
    }

    for route in &config.routes {
        let ifindex = *ifindex_by_name
            .get(route.interface.as_str())
            .with_context(|| {
                format!(
                    "route {}: unknown interface {:?}",
                    route.destination, route.interface
                )
            })?;
        let gateway = route.gateway.unwrap_or(Ipv4Addr::UNSPECIFIED);
        tables
            .routes()
            .insert(route.destination, NextHop { ifindex, gateway });
        info!(destination = %route.destination, gateway = %gateway, dev = %route.interface, "installed route");
    }

    for neighbor in &config.neighbors {
        let mac: MacAddr = neighbor
            .mac
            .parse()
            .with_context(|| format!("neighbor {}", neighbor.ip))?;
        tables.neighbors().set(neighbor.ip, mac);
        info!(ip = %neighbor.ip, mac = %mac, "registered neighbor");
    }

    for addr in &config.local_addresses {
        tables.add_local_address(*addr);
        info!(%addr, "registered local address");
    }

    Ok(())
}
