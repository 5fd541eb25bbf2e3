//! Shared helpers for CLI integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A throwaway HOME holding a snapshot and optional config.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self { dir: tempfile::tempdir()? })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Default ptrack directory under this HOME.
    pub fn ptrack_dir(&self) -> PathBuf {
        self.path().join(".ptrack")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.ptrack_dir().join("snapshot.json")
    }

    pub fn write_snapshot(&self, json: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(self.ptrack_dir())?;
        let path = self.snapshot_path();
        std::fs::write(&path, json)?;
        Ok(path)
    }

    pub fn write_config(&self, toml: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(self.ptrack_dir())?;
        let path = self.ptrack_dir().join("config.toml");
        std::fs::write(&path, toml)?;
        Ok(path)
    }

    /// `ptrack` with HOME pointed here and no credential env leaking in.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("ptrack").expect("ptrack binary");
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env_remove("RUST_LOG");
        for var in [
            "PTRACK_CONFIG",
            "PTRACK_SNAPSHOT",
            "PTRACK_TENANT_ID",
            "PTRACK_CLIENT_ID",
            "PTRACK_CLIENT_SECRET",
            "PTRACK_TOKEN",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }
}

/// Two teams sharing the "Widget" product, plus a completed task and an
/// unresolvable bucket.
pub const WIDGET_SNAPSHOT: &str = r#"{
  "fetched_at_utc": 1718000000,
  "tenant_id": "tn",
  "plans": [
    {
      "plan_id": "pa",
      "plan_name": "Alpha",
      "group_id": "ga",
      "buckets": [{"id": "b1", "name": "Design"}],
      "tasks": [
        {"id": "t1", "title": "Widget", "bucketId": "b1", "percentComplete": 50,
         "createdDateTime": "2024-05-01T09:00:00Z", "dueDateTime": "2024-06-30T00:00:00Z"},
        {"id": "t2", "title": "Gadget", "bucketId": "b1", "percentComplete": 100}
      ]
    },
    {
      "plan_id": "pb",
      "plan_name": "Beta",
      "group_id": "gb",
      "buckets": [{"id": "b2", "name": "QA"}],
      "tasks": [
        {"id": "t3", "title": "Widget", "bucketId": "b2", "percentComplete": 25},
        {"id": "t4", "title": "Gizmo", "bucketId": "zz"}
      ]
    }
  ]
}"#;
