//! Cycle arbitrage scanner
//!
//! Reads a JSON pool snapshot, runs one scan and prints the report as JSON on
//! stdout. Logs go to stderr.
//!
//! Usage: `cycle-arb [SNAPSHOT]`, or set `CYCLE_ARB_SNAPSHOT`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use config::{Config, Environment, File};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cycle_arb_core::{PoolRecord, ScanConfig};
use cycle_arb_detector::ArbitrageScanner;

const DEFAULT_CONFIG_FILE: &str = "cycle-arb.toml";

fn load_config() -> anyhow::Result<ScanConfig> {
    let path = env::var("CYCLE_ARB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let file = File::with_name(&path).required(false);

    scan_config(file, Environment::with_prefix("CYCLE_ARB"))
        .with_context(|| format!("Failed to load configuration from {}", path))
}

/// Layer environment over the file. Env values stay strings so decimal
/// fields are parsed exactly.
fn scan_config<F>(file: F, environment: Environment) -> anyhow::Result<ScanConfig>
where
    F: config::Source + Send + Sync + 'static,
{
    let settings = Config::builder()
        .add_source(file)
        .add_source(environment.ignore_empty(true))
        .build()?;

    settings
        .try_deserialize()
        .context("Invalid scan configuration")
}

fn snapshot_path() -> anyhow::Result<PathBuf> {
    if let Some(arg) = env::args_os().nth(1) {
        return Ok(PathBuf::from(arg));
    }
    match env::var_os("CYCLE_ARB_SNAPSHOT") {
        Some(path) => Ok(PathBuf::from(path)),
        None => bail!("No snapshot given: pass a path or set CYCLE_ARB_SNAPSHOT"),
    }
}

fn read_snapshot(path: &Path) -> anyhow::Result<Vec<PoolRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting cycle-arb v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    let path = snapshot_path()?;
    let pools = read_snapshot(&path)?;
    info!("Loaded {} pools from {}", pools.len(), path.display());

    let scanner = ArbitrageScanner::new(config)?;
    let report = scanner.scan(&pools);

    let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
    println!("{}", json);

    Ok(())
}
