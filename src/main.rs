/// poolctl - worker pool management for container clusters
///
/// A Rust-based tool for creating, resizing and zoning the worker pools of
/// clusters through the containerv1 cluster management API.
mod config;
mod containerv1;
mod utils;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ClientConfig, TOKEN_ENV};
use crate::containerv1::models::{
    Isolation, WorkerPool, WorkerPoolConfig, WorkerPoolRequest, WorkerPoolZone,
    WorkerPoolZoneNetwork,
};
use crate::containerv1::{ContainerClient, WorkerPoolClient, WorkerPoolManager};

#[derive(Parser)]
#[command(name = "poolctl")]
#[command(about = "Manage the worker pools of container clusters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "poolctl.yaml")]
    config: PathBuf,

    /// Override the API endpoint from the configuration file
    #[arg(long)]
    endpoint: Option<String>,

    /// Seconds to wait for a pool when --wait is given
    #[arg(long, default_value_t = 1800)]
    wait_timeout: u64,

    /// Seconds between checks while waiting
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    wait_interval: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Identifies one worker pool
#[derive(Args)]
struct PoolArgs {
    /// Cluster name or ID
    #[arg(long)]
    cluster: String,

    /// Worker pool ID
    #[arg(long)]
    pool: String,
}

/// VLANs for a worker pool zone
#[derive(Args)]
struct VlanArgs {
    /// Private VLAN ID
    #[arg(long)]
    private_vlan: String,

    /// Public VLAN ID (leave empty for private-only zones)
    #[arg(long, default_value = "")]
    public_vlan: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate example configuration file
    Init,

    /// Create a worker pool
    Create {
        /// Cluster name or ID
        #[arg(long)]
        cluster: String,

        /// Worker pool name
        #[arg(long)]
        name: String,

        /// Number of workers per zone
        #[arg(long)]
        size: u32,

        /// Machine type of the workers (e.g., "b3c.4x16")
        #[arg(long)]
        machine_type: String,

        /// Hardware isolation (public or private)
        #[arg(long, default_value_t = Isolation::Public)]
        isolation: Isolation,

        /// Encrypt the local disks of the workers
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        disk_encryption: bool,

        /// Worker label as key=value (repeatable)
        #[arg(long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,

        /// Zone as ID:PRIVATE_VLAN[:PUBLIC_VLAN] (repeatable)
        #[arg(long = "zone", value_parser = parse_zone)]
        zones: Vec<WorkerPoolZone>,

        /// Wait until the pool is normal
        #[arg(long)]
        wait: bool,
    },

    /// List worker pools of one or more clusters
    List {
        /// Cluster name or ID (repeatable)
        #[arg(long = "cluster", required = true)]
        clusters: Vec<String>,
    },

    /// Show a worker pool
    Get {
        #[command(flatten)]
        target: PoolArgs,
    },

    /// Delete a worker pool
    Delete {
        #[command(flatten)]
        target: PoolArgs,

        /// Wait until the pool is gone
        #[arg(long)]
        wait: bool,
    },

    /// Change the number of workers per zone
    Resize {
        #[command(flatten)]
        target: PoolArgs,

        /// New number of workers per zone
        #[arg(long)]
        size: u32,

        /// Wait until the pool is normal again
        #[arg(long)]
        wait: bool,
    },

    /// Replace the worker labels of a pool
    Labels {
        #[command(flatten)]
        target: PoolArgs,

        /// Worker label as key=value (repeatable)
        #[arg(long = "label", value_parser = parse_label, required = true)]
        labels: Vec<(String, String)>,
    },

    /// Manage the zones of a worker pool
    Zone {
        #[command(subcommand)]
        command: ZoneCommands,
    },
}

#[derive(Subcommand)]
enum ZoneCommands {
    /// Add a zone to a worker pool
    Add {
        #[command(flatten)]
        target: PoolArgs,

        /// Zone name (e.g., "dal10")
        #[arg(long)]
        zone: String,

        #[command(flatten)]
        vlans: VlanArgs,
    },

    /// Remove a zone from a worker pool
    Remove {
        #[command(flatten)]
        target: PoolArgs,

        /// Zone name
        #[arg(long)]
        zone: String,
    },

    /// Change the VLANs of a worker pool zone
    Network {
        #[command(flatten)]
        target: PoolArgs,

        /// Zone name
        #[arg(long)]
        zone: String,

        #[command(flatten)]
        vlans: VlanArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("poolctl={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(&cli).await {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Init => init_config(cli).await,
        Commands::Create {
            cluster,
            name,
            size,
            machine_type,
            isolation,
            disk_encryption,
            labels,
            zones,
            wait,
        } => {
            let request = WorkerPoolRequest {
                worker_pool_config: WorkerPoolConfig {
                    name: name.clone(),
                    size: *size,
                    machine_type: machine_type.clone(),
                    isolation: isolation.clone(),
                    labels: labels.iter().cloned().collect(),
                },
                disk_encryption: *disk_encryption,
                zones: zones.clone(),
            };
            create_pool(&build_manager(cli)?, cluster, &request, *wait).await
        }
        Commands::List { clusters } => list_pools(&build_manager(cli)?, clusters).await,
        Commands::Get { target } => {
            let pool = build_manager(cli)?
                .client()
                .get_worker_pool(&target.cluster, &target.pool)
                .await
                .context("Failed to get worker pool")?;
            log_pool(&pool);
            Ok(())
        }
        Commands::Delete { target, wait } => delete_pool(&build_manager(cli)?, target, *wait).await,
        Commands::Resize { target, size, wait } => {
            resize_pool(&build_manager(cli)?, target, *size, *wait).await
        }
        Commands::Labels { target, labels } => {
            let labels: HashMap<String, String> = labels.iter().cloned().collect();
            build_manager(cli)?
                .client()
                .update_labels(&target.cluster, &target.pool, &labels)
                .await
                .context("Failed to update worker pool labels")?;
            info!("✓ Labels of worker pool {} updated", target.pool);
            Ok(())
        }
        Commands::Zone { command } => zone_command(build_manager(cli)?.client(), command).await,
    }
}

/// Create a worker pool, optionally waiting for it to become normal
async fn create_pool(
    manager: &WorkerPoolManager,
    cluster: &str,
    request: &WorkerPoolRequest,
    wait: bool,
) -> Result<()> {
    let name = &request.worker_pool_config.name;
    info!("Creating worker pool {} in cluster {}...", name, cluster);
    let pool = manager
        .client()
        .create_worker_pool(cluster, request)
        .await
        .context("Failed to create worker pool")?;
    info!("✓ Worker pool created: {} (ID: {})", pool.worker_pool_config.name, pool.id);

    let pool = if wait {
        manager.wait_until_normal(cluster, &pool.id).await?
    } else {
        pool
    };
    log_pool(&pool);

    Ok(())
}

/// List the worker pools of every given cluster
async fn list_pools(manager: &WorkerPoolManager, clusters: &[String]) -> Result<()> {
    let mut failed = 0;
    for (cluster, result) in manager.list_for_clusters(clusters).await {
        match result {
            Ok(list) if list.is_empty() => {
                info!("No worker pools found for cluster: {}", cluster)
            }
            Ok(list) => {
                info!("Cluster: {}", cluster);
                for pool in &list {
                    info!(
                        "  - {} (ID: {}, Size: {}, Machine: {}, State: {}, Zones: {})",
                        pool.worker_pool_config.name,
                        pool.id,
                        pool.worker_pool_config.size,
                        pool.worker_pool_config.machine_type,
                        pool.state,
                        pool.zones.len()
                    );
                }
            }
            Err(e) => {
                warn!("{:#}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("Failed to list worker pools of {} cluster(s)", failed);
    }
    Ok(())
}

async fn delete_pool(manager: &WorkerPoolManager, target: &PoolArgs, wait: bool) -> Result<()> {
    info!("Deleting worker pool {}...", target.pool);
    manager
        .client()
        .delete_worker_pool(&target.cluster, &target.pool)
        .await
        .context("Failed to delete worker pool")?;
    if wait {
        manager
            .wait_until_deleted(&target.cluster, &target.pool)
            .await?;
    }
    info!("✓ Worker pool {} deleted", target.pool);
    Ok(())
}

async fn resize_pool(
    manager: &WorkerPoolManager,
    target: &PoolArgs,
    size: u32,
    wait: bool,
) -> Result<()> {
    info!("Resizing worker pool {} to {} workers per zone...", target.pool, size);
    manager
        .client()
        .resize_worker_pool(&target.cluster, &target.pool, size)
        .await
        .context("Failed to resize worker pool")?;
    if wait {
        let pool = manager
            .wait_until_normal(&target.cluster, &target.pool)
            .await?;
        log_pool(&pool);
    }
    info!("✓ Worker pool {} resized", target.pool);
    Ok(())
}

async fn zone_command(pools: &WorkerPoolClient, command: &ZoneCommands) -> Result<()> {
    match command {
        ZoneCommands::Add {
            target,
            zone,
            vlans,
        } => {
            let zone = WorkerPoolZone {
                id: zone.clone(),
                worker_pool_zone_network: WorkerPoolZoneNetwork {
                    private_vlan: vlans.private_vlan.clone(),
                    public_vlan: vlans.public_vlan.clone(),
                },
            };
            pools
                .add_zone(&target.cluster, &target.pool, &zone)
                .await
                .context("Failed to add zone")?;
            info!("✓ Zone {} added to worker pool {}", zone.id, target.pool);
        }
        ZoneCommands::Remove { target, zone } => {
            pools
                .remove_zone(&target.cluster, zone, &target.pool)
                .await
                .context("Failed to remove zone")?;
            info!("✓ Zone {} removed from worker pool {}", zone, target.pool);
        }
        ZoneCommands::Network {
            target,
            zone,
            vlans,
        } => {
            pools
                .update_zone_network(
                    &target.cluster,
                    zone,
                    &target.pool,
                    &vlans.private_vlan,
                    &vlans.public_vlan,
                )
                .await
                .context("Failed to update zone network")?;
            info!("✓ Network of zone {} updated", zone);
        }
    }

    Ok(())
}

/// Build the worker pool manager from configuration and flags
fn build_manager(cli: &Cli) -> Result<WorkerPoolManager> {
    let mut config = ClientConfig::load(&cli.config)?;
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    config.validate()?;

    if config.get_token().is_none() {
        warn!(
            "No API token configured; set {} or add a token to {}",
            TOKEN_ENV,
            cli.config.display()
        );
    }

    let client = ContainerClient::new(&config)?;
    info!("Using endpoint {}", client.endpoint());
    Ok(WorkerPoolManager::new(WorkerPoolClient::new(client)).with_polling(
        Duration::from_secs(cli.wait_timeout),
        Duration::from_secs(cli.wait_interval),
    ))
}

fn log_pool(pool: &WorkerPool) {
    let config = &pool.worker_pool_config;
    info!("Worker pool: {} (ID: {})", config.name, pool.id);
    info!("  State: {}", pool.state);
    info!("  Region: {}", pool.region);
    info!("  Size per zone: {}", config.size);
    info!("  Machine type: {}", config.machine_type);
    info!("  Isolation: {}", config.isolation);
    info!("  Worker version: {}", pool.worker_version);
    info!("  Balanced: {}", pool.is_balanced);
    if !pool.master_eos.is_empty() {
        info!("  Master end of support: {}", pool.master_eos);
    }
    if !pool.reason_for_delete.is_empty() {
        info!("  Reason for delete: {}", pool.reason_for_delete);
    }
    for (key, value) in &config.labels {
        info!("  Label: {}={}", key, value);
    }
    for zone in &pool.zones {
        info!("  Zone: {} ({} workers)", zone.id, zone.worker_count);
    }
}

/// Parse a key=value worker label
fn parse_label(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid label '{}', expected key=value", s)),
    }
}

/// Parse a ID:PRIVATE_VLAN[:PUBLIC_VLAN] zone
fn parse_zone(s: &str) -> Result<WorkerPoolZone, String> {
    let mut parts = s.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(id), Some(private_vlan), public_vlan) if !id.is_empty() && !private_vlan.is_empty() => {
            Ok(WorkerPoolZone {
                id: id.to_string(),
                worker_pool_zone_network: WorkerPoolZoneNetwork {
                    private_vlan: private_vlan.to_string(),
                    public_vlan: public_vlan.unwrap_or_default().to_string(),
                },
            })
        }
        _ => Err(format!(
            "invalid zone '{}', expected ID:PRIVATE_VLAN[:PUBLIC_VLAN]",
            s
        )),
    }
}

/// Initialize example configuration file
async fn init_config(cli: &Cli) -> Result<()> {
    if cli.config.exists() {
        anyhow::bail!(
            "Configuration file already exists: {}",
            cli.config.display()
        );
    }

    let example_config = ClientConfig::example();
    let yaml = serde_yaml::to_string(&example_config)?;

    tokio::fs::write(&cli.config, yaml)
        .await
        .context("Failed to write configuration file")?;

    info!("Example configuration created: {}", cli.config.display());
    info!("");
    info!("Next steps:");
    info!("  1. Edit the region and resource group to match your account");
    info!("  2. Set your IAM token:");
    info!("     export {}=your-token-here", TOKEN_ENV);
    info!("  3. List the worker pools of a cluster:");
    info!("     poolctl list --cluster my-cluster");

    Ok(())
}
