// ABOUTME: Job application tracker CSV loading and row normalisation
// ABOUTME: Maps stages to scores, failure modes to categories, and ages to decay weights

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use super::error::{MarketError, Result};
use super::weighting::DecayWeighting;

/// Stage score at or above which an application reached a recruiter
pub const RECRUITER_SCREEN_SCORE: u8 = 1;

/// Highest stage score (an offer)
pub const MAX_STAGE_SCORE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureMode {
    EligibilityGate,
    AtsPackaging,
    DomainMismatch,
    ToolingGap,
    SeniorityMismatch,
    WeakEvidence,
    ExternalNoise,
    Unknown,
}

impl FailureMode {
    pub const ALL: [FailureMode; 8] = [
        FailureMode::EligibilityGate,
        FailureMode::AtsPackaging,
        FailureMode::DomainMismatch,
        FailureMode::ToolingGap,
        FailureMode::SeniorityMismatch,
        FailureMode::WeakEvidence,
        FailureMode::ExternalNoise,
        FailureMode::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureMode::EligibilityGate => "ELIGIBILITY_GATE",
            FailureMode::AtsPackaging => "ATS_PACKAGING",
            FailureMode::DomainMismatch => "DOMAIN_MISMATCH",
            FailureMode::ToolingGap => "TOOLING_GAP",
            FailureMode::SeniorityMismatch => "SENIORITY_MISMATCH",
            FailureMode::WeakEvidence => "WEAK_EVIDENCE",
            FailureMode::ExternalNoise => "EXTERNAL_NOISE",
            FailureMode::Unknown => "UNKNOWN",
        }
    }

    /// Unrecognised or blank values fall back to `Unknown`
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == value)
            .unwrap_or(FailureMode::Unknown)
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score for a `current_stage` value; anything unrecognised scores zero
pub fn stage_score(stage: &str) -> u8 {
    match stage.trim() {
        "Auto_Rejected" | "Rejected_No_Response" => 0,
        "Recruiter_Screen" => 1,
        "Hiring_Manager" => 2,
        "Final_Round" => 3,
        "Offer" => 4,
        _ => 0,
    }
}

/// One normalised tracker row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub application_id: Option<String>,
    pub config_id: String,
    /// `None` when the tracker has a cluster column but this row leaves it blank
    pub cluster: Option<String>,
    pub role_family: Option<String>,
    pub ats_system: String,
    pub applied_date: Option<NaiveDate>,
    pub current_stage: Option<String>,
    pub stage_score: u8,
    pub failure_mode: FailureMode,
    pub days_since_apply: Option<f64>,
    pub weight: f64,
}

impl Application {
    pub fn reached_recruiter(&self) -> bool {
        self.stage_score >= RECRUITER_SCREEN_SCORE
    }
}

/// Reads tracker CSVs relative to a reference date
#[derive(Debug, Clone)]
pub struct TrackerReader {
    as_of: NaiveDate,
    weighting: DecayWeighting,
}

struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(headers: &csv::StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { index }
    }

    fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Non-blank trimmed value of `name` in `record`
    fn get<'r>(&self, record: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        let i = *self.index.get(name)?;
        record.get(i).map(str::trim).filter(|v| !v.is_empty())
    }
}

impl TrackerReader {
    pub fn new(as_of: NaiveDate, weighting: DecayWeighting) -> Self {
        Self { as_of, weighting }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Load a tracker file from disk
    pub async fn load<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Application>> {
        let path = path.as_ref();
        let bytes = fs::read(path).await.map_err(|source| MarketError::TrackerRead {
            path: path.display().to_string(),
            source,
        })?;

        let applications = self.read(bytes.as_slice())?;
        debug!(
            "Loaded {} applications from {}",
            applications.len(),
            path.display()
        );
        Ok(applications)
    }

    /// Parse tracker CSV content
    pub fn read<R: Read>(&self, reader: R) -> Result<Vec<Application>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns = Columns::new(csv_reader.headers()?);
        let records = csv_reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // A days column that is blank everywhere is treated as absent
        let days_from_column = columns.has("days_since_apply")
            && records
                .iter()
                .any(|r| columns.get(r, "days_since_apply").is_some());

        let applications = records
            .iter()
            .map(|record| self.normalise(&columns, record, days_from_column))
            .collect();

        Ok(applications)
    }

    fn normalise(
        &self,
        columns: &Columns,
        record: &csv::StringRecord,
        days_from_column: bool,
    ) -> Application {
        let applied_date = columns.get(record, "applied_date").and_then(parse_date);

        let days_since_apply = if days_from_column {
            columns
                .get(record, "days_since_apply")
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|d| d.is_finite())
        } else {
            applied_date.map(|date| (self.as_of - date).num_days() as f64)
        };

        let current_stage = columns.get(record, "current_stage").map(str::to_string);
        let stage_score = current_stage.as_deref().map(stage_score).unwrap_or(0);

        let failure_mode = columns
            .get(record, "failure_mode")
            .map(FailureMode::parse)
            .unwrap_or(FailureMode::Unknown);

        let config_id = if columns.has("config_id") {
            columns.get(record, "config_id").map(str::to_string)
        } else {
            // An absent variant column contributes an empty part; a blank cell voids the id
            let part = |name: &str| {
                if columns.has(name) {
                    columns.get(record, name)
                } else {
                    Some("")
                }
            };
            match (part("resume_variant"), part("cover_variant")) {
                (Some(resume), Some(cover)) => Some(format!("{}_{}", resume, cover)),
                _ => None,
            }
        }
        .unwrap_or_else(|| "unknown".to_string());

        let cluster = if columns.has("cluster") {
            columns.get(record, "cluster").map(str::to_string)
        } else {
            Some("UNKNOWN".to_string())
        };

        let ats_system = columns
            .get(record, "ats_system")
            .unwrap_or("UNKNOWN")
            .to_string();

        if applied_date.is_none() && days_since_apply.is_none() {
            warn!(
                "Application {} has no usable date and will carry no weight",
                columns.get(record, "application_id").unwrap_or("<unnamed>")
            );
        }

        Application {
            application_id: columns.get(record, "application_id").map(str::to_string),
            config_id,
            cluster,
            role_family: columns.get(record, "role_family").map(str::to_string),
            ats_system,
            applied_date,
            current_stage,
            stage_score,
            failure_mode,
            days_since_apply,
            weight: self.weighting.weight(days_since_apply),
        }
    }
}

/// Accepts `YYYY-MM-DD` and ISO date-times
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}
