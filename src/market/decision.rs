// ABOUTME: Keep/watch/abandon decisions for role clusters
// ABOUTME: Applies volume, screen-rate, trend, and failure-dominance conditions

use serde::{Deserialize, Serialize};
use std::fmt;

use super::aggregate::{ClusterMetrics, Tally};
use super::tracker::{Application, FailureMode};

/// Clusters with fewer applications than this are always watched
pub const MIN_APPLICATIONS: usize = 10;
pub const SCREEN_RATE_FLOOR: f64 = 0.10;
pub const TREND_WINDOW_DAYS: f64 = 30.0;
pub const DOMINANCE_SHARE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterDecision {
    Keep,
    Watch,
    Abandon,
}

impl fmt::Display for ClusterDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterDecision::Keep => f.write_str("keep"),
            ClusterDecision::Watch => f.write_str("watch"),
            ClusterDecision::Abandon => f.write_str("abandon"),
        }
    }
}

/// Which abandonment conditions hold for one cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub enough_volume: bool,
    pub low_screen_rate: bool,
    pub no_upward_trend: bool,
    pub fit_failures_dominate: bool,
}

impl Signals {
    pub fn collect(apps: &[&Application], metrics: &ClusterMetrics) -> Self {
        Self {
            enough_volume: metrics.num_applications >= MIN_APPLICATIONS,
            low_screen_rate: metrics.recruiter_screen_rate < SCREEN_RATE_FLOOR,
            no_upward_trend: !has_upward_trend(apps),
            fit_failures_dominate: fit_failures_dominate(apps),
        }
    }

    pub fn decide(&self) -> ClusterDecision {
        if !self.enough_volume {
            return ClusterDecision::Watch;
        }

        let held = [
            self.low_screen_rate,
            self.no_upward_trend,
            self.fit_failures_dominate,
        ];
        if held.iter().all(|h| *h) {
            ClusterDecision::Abandon
        } else if held.iter().any(|h| *h) {
            ClusterDecision::Watch
        } else {
            ClusterDecision::Keep
        }
    }
}

pub fn evaluate(apps: &[&Application], metrics: &ClusterMetrics) -> ClusterDecision {
    Signals::collect(apps, metrics).decide()
}

/// Recent screen rate beats the rate of older applications
fn has_upward_trend(apps: &[&Application]) -> bool {
    let (recent, older): (Vec<&Application>, Vec<&Application>) = apps
        .iter()
        .copied()
        .filter(|a| a.days_since_apply.is_some())
        .partition(|a| a.days_since_apply.unwrap_or(f64::MAX) <= TREND_WINDOW_DAYS);

    let recent = Tally::from_apps(recent);
    let older = Tally::from_apps(older);
    if !recent.has_weight() || !older.has_weight() {
        return false;
    }

    recent.screen_rate() > older.screen_rate()
}

/// Domain and seniority mismatches make up most known failures
fn fit_failures_dominate(apps: &[&Application]) -> bool {
    let known: Vec<&Application> = apps
        .iter()
        .copied()
        .filter(|a| a.failure_mode != FailureMode::Unknown)
        .collect();

    let known_weight: f64 = known.iter().map(|a| a.weight).sum();
    if known_weight <= 0.0 {
        return false;
    }

    let fit_weight: f64 = known
        .iter()
        .filter(|a| {
            matches!(
                a.failure_mode,
                FailureMode::DomainMismatch | FailureMode::SeniorityMismatch
            )
        })
        .map(|a| a.weight)
        .sum();

    fit_weight / known_weight > DOMINANCE_SHARE
}
