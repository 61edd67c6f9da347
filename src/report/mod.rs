// ABOUTME: Derives weekly report placeholder values from market aggregates
// ABOUTME: Ranks configs, clusters, and ATS systems into numbered report rows

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::market::{AtsPattern, MarketSnapshot};
use crate::template::TemplateContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    pub top_configs: usize,
    pub top_clusters: usize,
    pub top_ats: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_configs: 3,
            top_clusters: 3,
            top_ats: 3,
        }
    }
}

pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

pub fn format_depth(depth: f64) -> String {
    format!("{:.2}", depth)
}

pub fn format_days(days: f64) -> String {
    format!("{:.1}", days)
}

fn by_descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Most frequent failure mode for one ATS; earlier modes win ties
fn top_failure(pattern: &AtsPattern) -> Option<(&str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for (mode, freq) in pattern {
        match best {
            Some((_, best_freq)) if best_freq >= *freq => {}
            _ => best = Some((mode.as_str(), *freq)),
        }
    }
    best.filter(|(_, freq)| *freq > 0.0)
}

/// Placeholder values for the weekly report
///
/// Ranks beyond the available data are left out so those placeholders stay
/// unresolved.
pub fn variables(snapshot: &MarketSnapshot, options: &ReportOptions) -> TemplateContext {
    let mut context = TemplateContext::new();

    context.set("report_date", snapshot.as_of.format("%Y-%m-%d").to_string());
    context.set("total_applications", snapshot.total_applications.to_string());
    context.set(
        "overall_recruiter_screen_rate",
        format_rate(snapshot.market.overall_recruiter_screen_rate),
    );
    context.set(
        "overall_funnel_depth",
        format_depth(snapshot.market.overall_funnel_depth),
    );
    context.set(
        "overall_cluster_yield",
        format_rate(snapshot.market.overall_cluster_yield),
    );

    let mut configs: Vec<_> = snapshot.configs.iter().collect();
    configs.sort_by(|(a_id, a), (b_id, b)| {
        by_descending(a.recruiter_screen_rate, b.recruiter_screen_rate).then_with(|| a_id.cmp(b_id))
    });
    for (rank, (config_id, metrics)) in configs.into_iter().take(options.top_configs).enumerate() {
        let i = rank + 1;
        context.set(format!("config_id_{}", i), config_id.as_str());
        context.set(
            format!("recruiter_screen_rate_{}", i),
            format_rate(metrics.recruiter_screen_rate),
        );
        context.set(format!("funnel_depth_{}", i), format_depth(metrics.funnel_depth));
        context.set(
            format!("rejection_speed_{}", i),
            format_days(metrics.average_rejection_speed),
        );
        context.set(format!("applications_{}", i), metrics.num_applications.to_string());
        context.set(
            format!("baseline_{}", i),
            if metrics.is_baseline { "yes" } else { "no" },
        );
    }

    let mut clusters: Vec<_> = snapshot.clusters.iter().collect();
    clusters.sort_by(|(a_name, a), (b_name, b)| {
        by_descending(a.cluster_yield, b.cluster_yield).then_with(|| a_name.cmp(b_name))
    });
    for (rank, (cluster, metrics)) in clusters.into_iter().take(options.top_clusters).enumerate() {
        let j = rank + 1;
        context.set(format!("cluster_{}", j), cluster.as_str());
        context.set(
            format!("cluster_screen_rate_{}", j),
            format_rate(metrics.recruiter_screen_rate),
        );
        context.set(format!("cluster_yield_{}", j), format_rate(metrics.cluster_yield));
        context.set(
            format!("cluster_applications_{}", j),
            metrics.num_applications.to_string(),
        );
        if let Some(decision) = snapshot.decisions.get(cluster) {
            context.set(format!("cluster_decision_{}", j), decision.to_string());
        }
    }

    for (rank, (ats, pattern)) in snapshot.ats_patterns.iter().take(options.top_ats).enumerate() {
        let k = rank + 1;
        context.set(format!("ats_system_{}", k), ats.as_str());
        let (mode, freq) = top_failure(pattern).unwrap_or(("none", 0.0));
        context.set(format!("ats_top_failure_{}", k), mode);
        context.set(format!("ats_top_failure_rate_{}", k), format_rate(freq));
    }

    context
}
