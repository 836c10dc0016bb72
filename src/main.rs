use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use time::OffsetDateTime;
use tracing::{error, info};

use tcp_sweep::config::{BannerConfig, ScanConfig, DEFAULT_BANNER_BYTES};
use tcp_sweep::ports::{self, DEFAULT_END_PORT, DEFAULT_START_PORT};
use tcp_sweep::targets::{self, DEFAULT_TARGET};
use tcp_sweep::{logging, report, scanner};

/// tcp-sweep — concurrent TCP connect scanner with per-target worker pools.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tcp-sweep",
    version,
    about = "Concurrent TCP connect scanner with per-target worker pools and banner grabbing.",
    long_about = None
)]
struct Cli {
    /// Target host, IP or IPv4 CIDR. Repeatable and comma-separated.
    #[arg(short, long = "target", default_value = DEFAULT_TARGET)]
    targets: Vec<String>,

    /// Ports to scan, e.g. `22,80,8000-8010`. Overrides the start/end range.
    #[arg(short, long)]
    ports: Option<String>,

    /// File with one port or range per line (`#` comments allowed).
    #[arg(long = "ports-file")]
    ports_file: Option<PathBuf>,

    /// First port of the default range.
    #[arg(long = "start-port", default_value_t = DEFAULT_START_PORT)]
    start_port: u16,

    /// Last port of the default range.
    #[arg(long = "end-port", default_value_t = DEFAULT_END_PORT)]
    end_port: u16,

    /// Concurrent workers per target.
    #[arg(short, long, default_value_t = 100)]
    workers: usize,

    /// Connection timeout in seconds.
    #[arg(long, default_value_t = 2)]
    timeout: u64,

    /// Skip reading a greeting banner from open ports.
    #[arg(long = "no-banner", default_value_t = false)]
    no_banner: bool,

    /// How long to wait for a banner, in milliseconds.
    #[arg(long = "banner-timeout-ms", default_value_t = 2000)]
    banner_timeout_ms: u64,

    /// Cap on simultaneous connects across all targets (unbounded if omitted).
    #[arg(long = "max-in-flight")]
    max_in_flight: Option<usize>,

    /// Print results as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Also write results as pretty JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG overrides.
    #[arg(long = "log-level", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level)?;

    let targets = targets::expand_targets(cli.targets.as_slice()).context("invalid target list")?;
    let ports = ports::resolve_ports(
        cli.ports.as_deref(),
        cli.ports_file.as_deref(),
        cli.start_port,
        cli.end_port,
    )
    .context("failed to resolve ports")?;
    let config = ScanConfig::new(cli.workers, Duration::from_secs(cli.timeout))
        .with_banner(if cli.no_banner {
            BannerConfig::disabled()
        } else {
            BannerConfig {
                enabled: true,
                timeout: Duration::from_millis(cli.banner_timeout_ms),
                max_bytes: DEFAULT_BANNER_BYTES,
            }
        })
        .with_max_in_flight(cli.max_in_flight);
    config.validate()?;

    info!(
        targets = ?targets,
        ports = ports.len(),
        workers = config.workers,
        timeout_s = cli.timeout,
        banner = config.banner.enabled,
        max_in_flight = ?config.max_in_flight,
        "starting scan"
    );

    let started_at = OffsetDateTime::now_utc();
    let results = scanner::scan_targets(&targets, &ports, &config).await?;

    if cli.json {
        let json = report::render_json(&results).context("failed to serialize results")?;
        println!("{json}");
    } else {
        print!("{}", report::render_text(&results, started_at));
    }

    if let Some(path) = cli.output.as_deref() {
        match report::write_results_json(path, &results) {
            Ok(()) => info!(path = %path.display(), "wrote JSON results"),
            Err(e) => error!(path = %path.display(), error = %e, "failed to write JSON results"),
        }
    }

    Ok(())
}
