// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides scratch directories, tracker CSV builders, and CLI command setup

#![allow(dead_code)]

use assert_cmd::Command;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;

pub const TRACKER_HEADER: &str =
    "application_id,config_id,cluster,role_family,ats_system,applied_date,current_stage,failure_mode";

/// Reference date used across the market tests
pub fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
}

pub struct TestApplication {
    pub id: String,
    pub config_id: String,
    pub cluster: String,
    pub role_family: String,
    pub ats_system: String,
    pub applied_date: String,
    pub current_stage: String,
    pub failure_mode: String,
}

pub struct TrackerBuilder {
    applications: Vec<TestApplication>,
}

impl TrackerBuilder {
    pub fn new() -> Self {
        Self {
            applications: Vec::new(),
        }
    }

    /// Add an application applied `days_ago` days before [`as_of`]
    pub fn add_application(
        mut self,
        config_id: &str,
        cluster: &str,
        ats_system: &str,
        days_ago: i64,
        current_stage: &str,
        failure_mode: &str,
    ) -> Self {
        let applied = as_of() - chrono::Duration::days(days_ago);
        let id = format!("app-{:03}", self.applications.len() + 1);
        self.applications.push(TestApplication {
            id,
            config_id: config_id.to_string(),
            cluster: cluster.to_string(),
            role_family: "Security".to_string(),
            ats_system: ats_system.to_string(),
            applied_date: applied.format("%Y-%m-%d").to_string(),
            current_stage: current_stage.to_string(),
            failure_mode: failure_mode.to_string(),
        });
        self
    }

    /// Add `count` identical applications
    pub fn add_many(
        mut self,
        count: usize,
        config_id: &str,
        cluster: &str,
        ats_system: &str,
        days_ago: i64,
        current_stage: &str,
        failure_mode: &str,
    ) -> Self {
        for _ in 0..count {
            self = self.add_application(
                config_id,
                cluster,
                ats_system,
                days_ago,
                current_stage,
                failure_mode,
            );
        }
        self
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::from(TRACKER_HEADER);
        csv.push('\n');
        for app in &self.applications {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                app.id,
                app.config_id,
                app.cluster,
                app.role_family,
                app.ats_system,
                app.applied_date,
                app.current_stage,
                app.failure_mode
            ));
        }
        csv
    }

    pub async fn write_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        fs::write(path, self.to_csv()).await?;
        Ok(())
    }
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A small tracker spanning two configs, two clusters, and two ATS systems
pub fn sample_tracker() -> TrackerBuilder {
    TrackerBuilder::new()
        .add_application("R3-Technical-Plain", "GRC", "Workday", 5, "Recruiter_Screen", "")
        .add_application("R3-Technical-Plain", "GRC", "Greenhouse", 12, "Hiring_Manager", "")
        .add_application("R3-Technical-Plain", "AppSec", "Workday", 20, "Auto_Rejected", "ATS_PACKAGING")
        .add_application("R1-Narrative", "AppSec", "Workday", 3, "Auto_Rejected", "DOMAIN_MISMATCH")
        .add_application("R1-Narrative", "GRC", "Greenhouse", 40, "Rejected_No_Response", "")
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub async fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.file(name);
        fs::write(&path, content)
            .await
            .expect("Failed to write test file");
        path
    }

    pub async fn create_tracker(&self, name: &str, builder: &TrackerBuilder) -> PathBuf {
        let path = self.file(name);
        builder
            .write_to_file(&path)
            .await
            .expect("Failed to write tracker file");
        path
    }

    /// The CLI binary, run inside the scratch directory with logging quiet
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("applytrack").expect("Failed to find applytrack binary");
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env_remove("RUST_LOG")
            .env("APPLYTRACK_LOG_LEVEL", "error");
        cmd
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn read_json_output(
    file_path: &Path,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file_path).await?;
    let json: serde_json::Value = serde_json::from_str(&content)?;
    Ok(json)
}
