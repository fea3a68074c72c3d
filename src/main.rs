//! boxinfo - set-top box status snapshots
//!
//! Prints device status snapshots and live session queries of the local host.

use anyhow::Context;
use boxinfo::{
    current_time, AggregatorConfig, IdleSession, LinuxHost, Providers, Snapshot,
    SnapshotAggregator, SnapshotCache,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "boxinfo")]
#[command(about = "Set-top box status snapshots")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Collects hardware, network, storage and tuner status of a set-top box")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Filesystem root to read proc, sys and etc from
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Per-provider timeout in milliseconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a full status snapshot (default)
    Snapshot(SnapshotArgs),

    /// Show signal readings of the current service's tuner
    Frontend,

    /// Show playback status
    Status,

    /// Show the local time
    Time,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    let config = load_config(&cli)?;
    debug!(root = %config.root.display(), timeout_ms = config.provider_timeout_ms, "configuration loaded");

    let host = Arc::new(LinuxHost::new(config.clone()));
    let aggregator = SnapshotAggregator::new(
        Providers::from_host(host),
        config,
        Arc::new(SnapshotCache::new()),
    );
    // no media runtime on a generic host
    let session = IdleSession;

    match cli.command {
        Some(Commands::Snapshot(args)) => snapshot_command(&aggregator, args.format).await?,
        None => snapshot_command(&aggregator, OutputFormat::Pretty).await?,
        Some(Commands::Frontend) => print_json(&aggregator.frontend_status(&session).await)?,
        Some(Commands::Status) => print_json(&aggregator.status_info(&session).await)?,
        Some(Commands::Time) => print_json(&current_time())?,
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(cli, &directives))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// The level picked by `--verbose`/`--debug`, unless `RUST_LOG` gives directives.
fn log_filter(cli: &Cli, directives: &str) -> EnvFilter {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives)
}

fn load_config(cli: &Cli) -> anyhow::Result<AggregatorConfig> {
    let mut config = match &cli.config {
        Some(path) => AggregatorConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AggregatorConfig::default(),
    };
    if let Some(root) = &cli.root {
        config = config.with_root(root);
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_provider_timeout_ms(timeout);
    }
    config.validate()?;
    Ok(config)
}

async fn snapshot_command(
    aggregator: &SnapshotAggregator,
    format: OutputFormat,
) -> anyhow::Result<()> {
    info!("collecting snapshot");
    let snapshot = aggregator.snapshot(None, true).await;

    match format {
        OutputFormat::Json => print_json(&*snapshot)?,
        OutputFormat::Pretty => print_pretty_snapshot(&snapshot),
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_pretty_snapshot(snapshot: &Snapshot) {
    let hw = &snapshot.hardware;
    let sw = &snapshot.versions;

    println!("{} {} ({})", hw.brand, hw.model, hw.box_type);
    println!("==========================================");
    println!();

    println!("Hardware:");
    println!("  {}: {}", hw.friendly_chipset_description, hw.friendly_chipset_text);
    println!("  CPU: {} ({})", hw.cpu_brand, hw.cpu_arch);
    println!("  Memory: {}", snapshot.memory.summary);
    println!("  Uptime: {}", snapshot.uptime);
    println!();

    println!("Software:");
    println!("  Image: {} {}", sw.friendly_image_distro, sw.image_version);
    println!("  Kernel: {}", sw.kernel_version);
    println!("  Web interface: {}", sw.webif_version);
    println!();

    if !snapshot.tuners.is_empty() {
        println!("Tuners:");
        for tuner in &snapshot.tuners {
            println!("  {}: {}", tuner.name, tuner.kind);
        }
        println!();
    }

    if !snapshot.interfaces.is_empty() {
        println!("Network:");
        for iface in &snapshot.interfaces {
            println!(
                "  {}: {}/{} via {} ({}, {})",
                iface.name, iface.ip, iface.v4_prefix, iface.gateway, iface.ipv4_method, iface.link_speed
            );
            println!("    IPv6 ({}): {}", iface.ipv6_method, iface.ipv6);
        }
        println!();
    }

    if !snapshot.volumes.is_empty() {
        println!("Storage:");
        for volume in &snapshot.volumes {
            println!(
                "  {} on {}: {}",
                volume.model,
                volume.mount.as_deref().unwrap_or("-"),
                volume.friendly_capacity
            );
        }
        println!();
    }

    if !snapshot.shares.is_empty() {
        println!("Shares:");
        for share in &snapshot.shares {
            println!(
                "  {}: {} {} {} ({})",
                share.name, share.kind, share.friendly_address, share.path, share.mode
            );
        }
        println!();
    }

    if !snapshot.error.is_empty() {
        println!("Error: {}", snapshot.error);
    }
}
