// ABOUTME: Persists market aggregates as JSON memory files
// ABOUTME: Writes each file through a temporary sibling and an atomic rename

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::aggregate::MarketSnapshot;
use super::error::Result;

pub const CONFIG_PERFORMANCE_FILE: &str = "config_performance.json";
pub const CLUSTER_YIELD_FILE: &str = "cluster_yield.json";
pub const ATS_OUTCOME_PATTERNS_FILE: &str = "ats_outcome_patterns.json";
pub const MARKET_PERFORMANCE_FILE: &str = "market_performance.json";

/// Write all four aggregate files into `dir`, creating it if needed
pub async fn write_snapshot(snapshot: &MarketSnapshot, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).await?;

    let written = vec![
        write_json_atomic(&snapshot.configs, &dir.join(CONFIG_PERFORMANCE_FILE)).await?,
        write_json_atomic(&snapshot.clusters, &dir.join(CLUSTER_YIELD_FILE)).await?,
        write_json_atomic(&snapshot.ats_patterns, &dir.join(ATS_OUTCOME_PATTERNS_FILE)).await?,
        write_json_atomic(&snapshot.market, &dir.join(MARKET_PERFORMANCE_FILE)).await?,
    ];

    info!(
        "Updated {} configuration metrics, {} cluster metrics, {} ATS patterns in {}",
        snapshot.configs.len(),
        snapshot.clusters.len(),
        snapshot.ats_patterns.len(),
        dir.display()
    );

    Ok(written)
}

/// Serialize `value` to `path` without leaving a partially written file behind
pub async fn write_json_atomic<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<PathBuf> {
    let content = serde_json::to_string_pretty(value)?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, content).await?;
    fs::rename(&tmp_path, path).await?;

    debug!("Wrote {}", path.display());
    Ok(path.to_path_buf())
}
