// ABOUTME: Time-weighted market aggregates over tracked applications
// ABOUTME: Computes per-config, per-cluster, per-ATS, and overall performance metrics

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::decision::{self, ClusterDecision};
use super::tracker::{Application, FailureMode, MAX_STAGE_SCORE};

const SCREEN_RATE_YIELD_WEIGHT: f64 = 0.6;
const DEPTH_YIELD_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetrics {
    pub recruiter_screen_rate: f64,
    pub funnel_depth: f64,
    pub average_rejection_speed: f64,
    pub num_applications: usize,
    pub is_baseline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMetrics {
    pub recruiter_screen_rate: f64,
    pub funnel_depth: f64,
    pub cluster_yield: f64,
    pub num_applications: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMetrics {
    pub overall_recruiter_screen_rate: f64,
    pub overall_funnel_depth: f64,
    pub overall_cluster_yield: f64,
    pub last_updated: String,
}

/// Weighted failure-mode frequencies for one ATS, in canonical mode order
pub type AtsPattern = IndexMap<String, f64>;

#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub as_of: NaiveDate,
    pub total_applications: usize,
    pub configs: BTreeMap<String, ConfigMetrics>,
    pub clusters: BTreeMap<String, ClusterMetrics>,
    pub ats_patterns: BTreeMap<String, AtsPattern>,
    pub market: MarketMetrics,
    pub decisions: BTreeMap<String, ClusterDecision>,
}

/// Running weighted sums for a group of applications
#[derive(Debug, Clone, Copy, Default)]
pub struct Tally {
    pub weight: f64,
    pub screened_weight: f64,
    pub stage_weight: f64,
    pub days_weight: f64,
    pub count: usize,
}

impl Tally {
    pub fn add(&mut self, app: &Application) {
        self.weight += app.weight;
        if app.reached_recruiter() {
            self.screened_weight += app.weight;
        }
        self.stage_weight += f64::from(app.stage_score) * app.weight;
        if let Some(days) = app.days_since_apply {
            self.days_weight += days * app.weight;
        }
        self.count += 1;
    }

    pub fn from_apps<'a>(apps: impl IntoIterator<Item = &'a Application>) -> Self {
        let mut tally = Self::default();
        for app in apps {
            tally.add(app);
        }
        tally
    }

    pub fn has_weight(&self) -> bool {
        self.weight > 0.0
    }

    pub fn screen_rate(&self) -> f64 {
        ratio(self.screened_weight, self.weight)
    }

    pub fn funnel_depth(&self) -> f64 {
        ratio(self.stage_weight, self.weight)
    }

    pub fn average_days(&self) -> f64 {
        ratio(self.days_weight, self.weight)
    }

    pub fn cluster_yield(&self) -> f64 {
        cluster_yield(self.screen_rate(), self.funnel_depth())
    }
}

/// Blend of screen rate and funnel depth normalised to 0..1
pub fn cluster_yield(screen_rate: f64, funnel_depth: f64) -> f64 {
    SCREEN_RATE_YIELD_WEIGHT * screen_rate + DEPTH_YIELD_WEIGHT * (funnel_depth / MAX_STAGE_SCORE)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn group_by<'a, F>(apps: &'a [Application], key: F) -> BTreeMap<String, Vec<&'a Application>>
where
    F: Fn(&'a Application) -> Option<&'a str>,
{
    let mut groups: BTreeMap<String, Vec<&Application>> = BTreeMap::new();
    for app in apps {
        if let Some(k) = key(app) {
            groups.entry(k.to_string()).or_default().push(app);
        }
    }
    groups
}

pub fn config_metrics(apps: &[Application]) -> BTreeMap<String, ConfigMetrics> {
    let groups = group_by(apps, |a| Some(a.config_id.as_str()));
    let mut metrics: BTreeMap<String, ConfigMetrics> = groups
        .into_iter()
        .filter_map(|(config_id, group)| {
            let tally = Tally::from_apps(group);
            tally.has_weight().then(|| {
                (
                    config_id,
                    ConfigMetrics {
                        recruiter_screen_rate: tally.screen_rate(),
                        funnel_depth: tally.funnel_depth(),
                        average_rejection_speed: tally.average_days(),
                        num_applications: tally.count,
                        is_baseline: false,
                    },
                )
            })
        })
        .collect();

    let rates: Vec<f64> = metrics.values().map(|m| m.recruiter_screen_rate).collect();
    if let Some(median_rate) = median(&rates) {
        for m in metrics.values_mut() {
            m.is_baseline = m.recruiter_screen_rate >= median_rate;
        }
    }

    metrics
}

pub fn cluster_metrics(apps: &[Application]) -> BTreeMap<String, ClusterMetrics> {
    group_by(apps, |a| a.cluster.as_deref())
        .into_iter()
        .filter_map(|(cluster, group)| {
            let tally = Tally::from_apps(group);
            tally.has_weight().then(|| {
                (
                    cluster,
                    ClusterMetrics {
                        recruiter_screen_rate: tally.screen_rate(),
                        funnel_depth: tally.funnel_depth(),
                        cluster_yield: tally.cluster_yield(),
                        num_applications: tally.count,
                    },
                )
            })
        })
        .collect()
}

pub fn ats_patterns(apps: &[Application]) -> BTreeMap<String, AtsPattern> {
    group_by(apps, |a| Some(a.ats_system.as_str()))
        .into_iter()
        .map(|(ats, group)| {
            let total: f64 = group.iter().map(|a| a.weight).sum();
            let pattern = FailureMode::ALL
                .iter()
                .map(|mode| {
                    let mode_weight: f64 = group
                        .iter()
                        .filter(|a| a.failure_mode == *mode)
                        .map(|a| a.weight)
                        .sum();
                    (mode.as_str().to_string(), ratio(mode_weight, total))
                })
                .collect();
            (ats, pattern)
        })
        .collect()
}

pub fn market_metrics(apps: &[Application], as_of: NaiveDate) -> MarketMetrics {
    let tally = Tally::from_apps(apps);
    MarketMetrics {
        overall_recruiter_screen_rate: tally.screen_rate(),
        overall_funnel_depth: tally.funnel_depth(),
        overall_cluster_yield: tally.cluster_yield(),
        last_updated: as_of.format("%Y-%m-%d").to_string(),
    }
}

pub fn cluster_decisions(
    apps: &[Application],
    clusters: &BTreeMap<String, ClusterMetrics>,
) -> BTreeMap<String, ClusterDecision> {
    let groups = group_by(apps, |a| a.cluster.as_deref());
    clusters
        .iter()
        .filter_map(|(cluster, metrics)| {
            let group = groups.get(cluster)?;
            Some((cluster.clone(), decision::evaluate(group, metrics)))
        })
        .collect()
}

/// Compute every aggregate for a set of applications
pub fn aggregate(apps: &[Application], as_of: NaiveDate) -> MarketSnapshot {
    let clusters = cluster_metrics(apps);
    let decisions = cluster_decisions(apps, &clusters);

    MarketSnapshot {
        as_of,
        total_applications: apps.len(),
        configs: config_metrics(apps),
        ats_patterns: ats_patterns(apps),
        market: market_metrics(apps, as_of),
        clusters,
        decisions,
    }
}
