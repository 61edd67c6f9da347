// ABOUTME: Integration tests for the market feedback pipeline
// ABOUTME: Covers tracker loading, aggregates, cluster decisions, persistence, and report values

use applytrack::market::{store, ClusterDecision, MarketAnalyzer, MarketSnapshot};
use applytrack::report::{self, ReportOptions};
use applytrack::template::TemplateEngine;
use applytrack::Document;

mod common;
use common::{as_of, read_json_output, TestEnvironment, TrackerBuilder};

/// Three clusters, one per decision outcome
fn decision_tracker() -> TrackerBuilder {
    TrackerBuilder::new()
        // AppSec: no screens, fit failures, flat trend
        .add_many(6, "R1-Narrative", "AppSec", "Workday", 10, "Auto_Rejected", "DOMAIN_MISMATCH")
        .add_many(6, "R1-Narrative", "AppSec", "Workday", 50, "Auto_Rejected", "SENIORITY_MISMATCH")
        // GRC: recent screens after older packaging rejections
        .add_many(6, "R3-Technical-Plain", "GRC", "Greenhouse", 10, "Recruiter_Screen", "")
        .add_many(6, "R3-Technical-Plain", "GRC", "Greenhouse", 50, "Auto_Rejected", "ATS_PACKAGING")
        // Cloud: too few applications to judge
        .add_many(3, "R2-Metrics", "Cloud", "Lever", 20, "Hiring_Manager", "")
}

async fn analyze(env: &TestEnvironment, builder: &TrackerBuilder) -> MarketSnapshot {
    let tracker = env.create_tracker("tracker.csv", builder).await;
    MarketAnalyzer::new(as_of(), 60.0)
        .unwrap()
        .analyze_file(&tracker)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_cluster_decisions() {
    let env = TestEnvironment::new();
    let snapshot = analyze(&env, &decision_tracker()).await;

    assert_eq!(snapshot.total_applications, 27);
    assert_eq!(snapshot.decisions["AppSec"], ClusterDecision::Abandon);
    assert_eq!(snapshot.decisions["GRC"], ClusterDecision::Keep);
    assert_eq!(snapshot.decisions["Cloud"], ClusterDecision::Watch);
}

#[tokio::test]
async fn test_config_metrics_and_baseline() {
    let env = TestEnvironment::new();
    let snapshot = analyze(&env, &decision_tracker()).await;

    let r1 = &snapshot.configs["R1-Narrative"];
    let r2 = &snapshot.configs["R2-Metrics"];
    let r3 = &snapshot.configs["R3-Technical-Plain"];

    assert_eq!(r1.recruiter_screen_rate, 0.0);
    assert_eq!(r2.recruiter_screen_rate, 1.0);
    assert!((r2.funnel_depth - 2.0).abs() < 1e-9);
    assert!((r2.average_rejection_speed - 20.0).abs() < 1e-9);

    // Recent screens outweigh older rejections under decay
    let recent = 2f64.powf(-10.0 / 60.0);
    let older = 2f64.powf(-50.0 / 60.0);
    let expected = recent / (recent + older);
    assert!((r3.recruiter_screen_rate - expected).abs() < 1e-9);
    assert_eq!(r3.num_applications, 12);

    // Median of the three rates is R3's
    assert!(!r1.is_baseline);
    assert!(r2.is_baseline);
    assert!(r3.is_baseline);
}

#[tokio::test]
async fn test_snapshot_persisted_as_json() {
    let env = TestEnvironment::new();
    let snapshot = analyze(&env, &decision_tracker()).await;
    let dir = env.file("memory");

    let written = store::write_snapshot(&snapshot, &dir).await.unwrap();
    assert_eq!(written.len(), 4);
    assert!(written.iter().all(|p| p.exists()));
    assert!(!dir.join("config_performance.json.tmp").exists());

    let market = read_json_output(&dir.join(store::MARKET_PERFORMANCE_FILE))
        .await
        .unwrap();
    assert_eq!(market["last_updated"], "2024-05-06");

    let ats = read_json_output(&dir.join(store::ATS_OUTCOME_PATTERNS_FILE))
        .await
        .unwrap();
    assert_eq!(ats["Workday"].as_object().unwrap().len(), 8);
    assert_eq!(ats["Lever"]["UNKNOWN"], 1.0);

    // Failure modes keep their canonical order on disk
    let raw = tokio::fs::read_to_string(dir.join(store::ATS_OUTCOME_PATTERNS_FILE))
        .await
        .unwrap();
    let eligibility = raw.find("ELIGIBILITY_GATE").unwrap();
    let packaging = raw.find("ATS_PACKAGING").unwrap();
    assert!(eligibility < packaging);

    let clusters = read_json_output(&dir.join(store::CLUSTER_YIELD_FILE))
        .await
        .unwrap();
    let names: Vec<&String> = clusters.as_object().unwrap().keys().collect();
    assert_eq!(names, vec!["AppSec", "Cloud", "GRC"]);
}

#[tokio::test]
async fn test_report_variables_ranked() {
    let env = TestEnvironment::new();
    let snapshot = analyze(&env, &decision_tracker()).await;
    let vars = report::variables(&snapshot, &ReportOptions::default());

    assert_eq!(vars.get("report_date"), Some("2024-05-06"));
    assert_eq!(vars.get("total_applications"), Some("27"));

    assert_eq!(vars.get("config_id_1"), Some("R2-Metrics"));
    assert_eq!(vars.get("recruiter_screen_rate_1"), Some("100.0%"));
    assert_eq!(vars.get("funnel_depth_1"), Some("2.00"));
    assert_eq!(vars.get("config_id_2"), Some("R3-Technical-Plain"));
    assert_eq!(vars.get("config_id_3"), Some("R1-Narrative"));
    assert_eq!(vars.get("baseline_3"), Some("no"));

    assert_eq!(vars.get("cluster_1"), Some("Cloud"));
    assert_eq!(vars.get("cluster_decision_1"), Some("watch"));
    assert_eq!(vars.get("cluster_2"), Some("GRC"));
    assert_eq!(vars.get("cluster_decision_2"), Some("keep"));
    assert_eq!(vars.get("cluster_3"), Some("AppSec"));
    assert_eq!(vars.get("cluster_decision_3"), Some("abandon"));
    assert_eq!(vars.get("cluster_yield_3"), Some("0.0%"));

    assert_eq!(vars.get("ats_system_1"), Some("Greenhouse"));
    assert_eq!(vars.get("ats_system_3"), Some("Workday"));
    assert_eq!(vars.get("ats_top_failure_3"), Some("DOMAIN_MISMATCH"));
}

#[tokio::test]
async fn test_weekly_report_fully_rendered() {
    let env = TestEnvironment::new();
    let snapshot = analyze(&env, &decision_tracker()).await;

    let mut vars = report::variables(&snapshot, &ReportOptions::default());
    vars.set("observations", "Fit failures dominate AppSec.");
    vars.set("next_week_focus", "Shift volume to GRC.");

    let rendered = TemplateEngine::new()
        .strict()
        .render(Document::WeeklyReport.content(), &vars)
        .unwrap();

    assert!(rendered.is_complete());
    assert!(rendered
        .text
        .contains("| 3 | AppSec | 0.0% | 0.0% | 12 | abandon |"));
}

#[tokio::test]
async fn test_rows_without_dates_carry_no_weight() {
    let env = TestEnvironment::new();
    let tracker = env
        .write_file(
            "tracker.csv",
            "config_id,cluster,ats_system,applied_date,current_stage\n\
             R1,GRC,Workday,,Offer\n\
             R1,GRC,Workday,2024-05-06,Auto_Rejected\n",
        )
        .await;

    let snapshot = MarketAnalyzer::new(as_of(), 60.0)
        .unwrap()
        .analyze_file(&tracker)
        .await
        .unwrap();

    assert_eq!(snapshot.total_applications, 2);
    let r1 = &snapshot.configs["R1"];
    assert_eq!(r1.num_applications, 2);
    assert_eq!(r1.recruiter_screen_rate, 0.0);
    assert_eq!(r1.funnel_depth, 0.0);
}

#[tokio::test]
async fn test_infinite_days_do_not_poison_averages() {
    let env = TestEnvironment::new();
    let tracker = env
        .write_file(
            "tracker.csv",
            "config_id,cluster,ats_system,days_since_apply,current_stage\n\
             R1,GRC,Workday,inf,Auto_Rejected\n\
             R1,GRC,Workday,-inf,Recruiter_Screen\n\
             R1,GRC,Workday,5,Auto_Rejected\n",
        )
        .await;

    let snapshot = MarketAnalyzer::new(as_of(), 60.0)
        .unwrap()
        .analyze_file(&tracker)
        .await
        .unwrap();

    let r1 = &snapshot.configs["R1"];
    assert_eq!(r1.num_applications, 3);
    assert!((r1.average_rejection_speed - 5.0).abs() < 1e-9);
    assert_eq!(r1.recruiter_screen_rate, 0.0);
    assert!(r1.funnel_depth.is_finite());
}

#[test]
fn test_invalid_half_life_rejected() {
    assert!(MarketAnalyzer::new(as_of(), 0.0).is_err());
    assert!(MarketAnalyzer::new(as_of(), -5.0).is_err());
}
