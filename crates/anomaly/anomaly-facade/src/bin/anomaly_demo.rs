//! anomaly_demo
//!
//! Registers the built-in rules in a file-backed pool, runs them over a
//! synthetic host and prints the ranked alarms as JSON.
//!
//! Environment:
//! - `ENGINE_POOL_PATH`: pool document (defaults to the temp directory)
//! - `ENGINE_PARAMS_FILE`: JSON `{"params": {...}, "thresholds": {...}}`
//! - `ENGINE_PARAM_*` / `ENGINE_THRESHOLD_*`: single overrides
//! - `RUST_LOG`: log filter

use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anomaly_facade::{
    register_builtin_rules, AlarmReporter, DetectorPool, ForecastContext, JsonFileStore,
    MemorySource, Sequence, StaticParams, TracingReporter,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MINUTE: i64 = 60_000;

fn load_params() -> Result<StaticParams, Box<dyn Error>> {
    let params = match env::var("ENGINE_PARAMS_FILE") {
        Ok(path) => StaticParams::from_json_str(&std::fs::read_to_string(path)?)?,
        Err(_) => StaticParams::new(),
    };
    Ok(params.with_env_overrides())
}

/// Two hours of a host whose disk fills up and whose memory leaks.
fn synthetic_host(now: i64) -> MemorySource {
    let points = 120;
    let start = now - (points as i64 - 1) * MINUTE;
    let wobble = |i: usize| (i as f64 * 0.7).sin() * 0.002;

    let disk = (0..points).map(|i| 0.78 + 0.0012 * i as f64 + wobble(i)).collect();
    let memory = (0..points).map(|i| 0.45 + 0.002 * i as f64 + wobble(i)).collect();
    let cpu = (0..points).map(|i| 0.25 + wobble(i) * 10.0).collect();

    let host = |name: &str, values: Vec<f64>| {
        Sequence::from_values(start, MINUTE, values)
            .named(name)
            .label("instance", "10.0.0.5:9100")
    };
    MemorySource::new(vec![
        host("os_disk_usage", disk),
        host("os_mem_usage", memory),
        host("os_cpu_usage", cpu),
    ])
    .with_name("synthetic")
}

fn run() -> Result<(), Box<dyn Error>> {
    let params = load_params()?;
    let pool_path = env::var("ENGINE_POOL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("anomaly-demo-pool.json"));

    let pool = DetectorPool::open(JsonFileStore::new(&pool_path))?;
    let added = register_builtin_rules(&pool, &params)?;
    tracing::info!(path = %pool_path.display(), added, detectors = pool.len(), "detector pool ready");

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as i64;
    let source = synthetic_host(now);
    let mut ctx = ForecastContext::new();
    let alarms = pool.detect_all(&source, &mut ctx, now);

    TracingReporter.report(&alarms)?;
    println!("{}", serde_json::to_string_pretty(&alarms)?);
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anomaly_demo=info,anomaly_core=info".into()),
        )
        .init();

    if let Err(e) = run() {
        tracing::error!(error = %e, "demo failed");
        std::process::exit(1);
    }
}
