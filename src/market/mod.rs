// ABOUTME: Market feedback aggregates computed from the job application tracker
// ABOUTME: Loads tracker rows, weights them by age, and derives per-group performance

pub mod aggregate;
pub mod decision;
pub mod error;
pub mod store;
pub mod tracker;
pub mod weighting;

use chrono::NaiveDate;
use std::path::Path;

pub use aggregate::{
    aggregate, AtsPattern, ClusterMetrics, ConfigMetrics, MarketMetrics, MarketSnapshot,
};
pub use decision::ClusterDecision;
pub use error::{MarketError, Result};
pub use tracker::{Application, FailureMode, TrackerReader};
pub use weighting::{DecayWeighting, DEFAULT_HALF_LIFE_DAYS};

/// Loads a tracker and computes its aggregates as of a fixed date
#[derive(Debug, Clone)]
pub struct MarketAnalyzer {
    reader: TrackerReader,
}

impl MarketAnalyzer {
    pub fn new(as_of: NaiveDate, half_life_days: f64) -> Result<Self> {
        let weighting = DecayWeighting::new(half_life_days)?;
        Ok(Self {
            reader: TrackerReader::new(as_of, weighting),
        })
    }

    pub fn as_of(&self) -> NaiveDate {
        self.reader.as_of()
    }

    pub async fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<MarketSnapshot> {
        let applications = self.reader.load(path).await?;
        Ok(self.analyze(&applications))
    }

    pub fn analyze(&self, applications: &[Application]) -> MarketSnapshot {
        aggregate(applications, self.reader.as_of())
    }
}
