//! Fetched planner data and its on-disk cache.
//!
//! A `Snapshot` is the result of one fetch run: every plan that was retrieved
//! successfully, with its buckets and tasks. Views are recomputed from it
//! without touching the network.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::{Bucket, Task};

/// Bucket name used when a task has no bucket or its bucket is not in the plan.
pub const UNKNOWN_BUCKET: &str = "Unknown";

/// One successfully fetched plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanData {
    pub plan_id: String,
    pub plan_name: String,
    pub group_id: String,
    pub buckets: Vec<Bucket>,
    pub tasks: Vec<Task>,
}

impl PlanData {
    /// Map bucket IDs to names for this plan.
    pub fn bucket_map(&self) -> HashMap<&str, &str> {
        self.buckets
            .iter()
            .map(|b| (b.id.as_str(), b.name.as_str()))
            .collect()
    }
}

/// Resolve a task's bucket name, defaulting to `Unknown`.
pub fn resolve_bucket<'a>(map: &HashMap<&str, &'a str>, bucket_id: Option<&str>) -> &'a str {
    bucket_id
        .and_then(|id| map.get(id).copied())
        .unwrap_or(UNKNOWN_BUCKET)
}

/// All plans retrieved by one fetch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub fetched_at_utc: i64,
    pub tenant_id: String,
    pub plans: Vec<PlanData>,
}

impl Snapshot {
    /// Create an empty snapshot stamped with the current time.
    pub fn new(tenant_id: &str) -> Self {
        Snapshot {
            fetched_at_utc: Utc::now().timestamp(),
            tenant_id: tenant_id.to_string(),
            plans: Vec::new(),
        }
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::SnapshotMissing(path.to_path_buf()));
        }
        let mut buf = String::new();
        File::open(path).and_then(|mut f| f.read_to_string(&mut buf))?;
        serde_json::from_str(&buf).map_err(|e| Error::Snapshot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save snapshot to JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Total number of tasks across all plans.
    pub fn task_count(&self) -> usize {
        self.plans.iter().map(|p| p.tasks.len()).sum()
    }
}

/// Render an RFC 3339 timestamp as `YYYY-MM-DD`; absent or invalid input renders as `None`.
pub fn format_timestamp(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d").to_string())
}

/// Render the fetch time of a snapshot for headers.
pub fn format_fetched_at(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "-".into())
}

/// Truncate a string to fit in the specified width, adding ellipsis if needed.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max <= 1 {
        "…".to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}
