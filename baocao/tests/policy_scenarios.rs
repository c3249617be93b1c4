mod helpers;

use std::sync::Arc;

use baocao::{Baocao, Step};
use baocao_core::{
    AnalysisIntent, CollectedOutcome, Consolidation, PeriodKey, ReportPeriod, ReportRequest,
};
use baocao_mock::{MockSource, ScriptedChannel};
use helpers::{doc, fpt_q1_pair, fpt_q2_pair};

fn quarterly(quarter: u8) -> ReportRequest {
    ReportRequest::new("FPT", ReportPeriod::Quarter)
        .with_year(2024)
        .with_quarter(quarter)
}

fn intent(requests: Vec<ReportRequest>) -> AnalysisIntent {
    AnalysisIntent {
        requests,
        comparison_context: "Policy scenario.".to_string(),
    }
}

fn engine_for(source: MockSource) -> Baocao {
    Baocao::builder()
        .with_source(Arc::new(source))
        .build()
        .expect("engine builds")
}

#[tokio::test]
async fn ambiguous_q2_offers_exactly_both_statuses() {
    let engine = engine_for(MockSource::new().with_listing("FPT", Some(2024), fpt_q2_pair()));
    let mut run = engine.start_batch(intent(vec![quarterly(2)]));

    let Step::AwaitingChoice { choices, .. } = engine.advance(&mut run).await else {
        panic!("expected a clarification park");
    };
    assert_eq!(choices.len(), 2);
    assert_eq!(choices[0].consolidation, Consolidation::Consolidated);
    assert!(choices[0].title.contains("hợp nhất"));
    assert_eq!(choices[1].consolidation, Consolidation::ParentOnly);
    assert!(choices[1].title.contains("công ty mẹ"));
}

#[tokio::test]
async fn explicit_consolidated_q2_resolves_without_suspension() {
    let source = MockSource::new().with_listing("FPT", Some(2024), fpt_q2_pair());
    let channel = Arc::new(ScriptedChannel::new([]));
    let engine = Baocao::builder()
        .with_source(Arc::new(source))
        .with_choice_channel(channel.clone())
        .build()
        .expect("engine builds");

    let request = quarterly(2).with_consolidation(Consolidation::Consolidated);
    let id = request.request_id.clone();
    let report = engine
        .resolve_batch(intent(vec![request]))
        .await
        .expect("batch completes");

    assert_eq!(
        report.collected[&id],
        CollectedOutcome::Resolved {
            link: "https://x/fpt-q2-hn.pdf".to_string()
        }
    );
    assert_eq!(channel.calls(), 0);
}

#[tokio::test]
async fn explicit_status_with_an_empty_bucket_fails_without_fallback() {
    // Q1 has candidates for both statuses, but the explicit Q2 constraint
    // must fail outright rather than walk back to them.
    let source = MockSource::new().with_listing("FPT", Some(2024), fpt_q1_pair());
    let channel = Arc::new(ScriptedChannel::new([]));
    let engine = Baocao::builder()
        .with_source(Arc::new(source))
        .with_choice_channel(channel.clone())
        .build()
        .expect("engine builds");

    let request = quarterly(2).with_consolidation(Consolidation::Consolidated);
    let id = request.request_id.clone();
    let report = engine
        .resolve_batch(intent(vec![request]))
        .await
        .expect("batch completes");

    let CollectedOutcome::Failed { reason } = &report.collected[&id] else {
        panic!("expected failure");
    };
    assert!(reason.contains("quarter 2"), "reason: {reason}");
    assert!(reason.contains("consolidated"), "reason: {reason}");
    assert_eq!(channel.calls(), 0);
}

#[tokio::test]
async fn q3_request_falls_back_to_q1_only_and_the_prompt_says_so() {
    // Q3 and Q2 empty, Q1 populated with both statuses.
    let engine = engine_for(MockSource::new().with_listing("FPT", Some(2024), fpt_q1_pair()));
    let mut run = engine.start_batch(intent(vec![quarterly(3)]));

    let Step::AwaitingChoice { prompt, choices } = engine.advance(&mut run).await else {
        panic!("expected a clarification park");
    };
    assert!(prompt.contains("quarter 3"), "prompt: {prompt}");
    assert_eq!(choices.len(), 2);
    assert!(
        choices
            .iter()
            .all(|c| c.period == PeriodKey::Quarter(1))
    );
}

#[tokio::test]
async fn fallback_stops_at_the_first_non_empty_quarter() {
    // Q4 requested; Q3 holds one candidate, Q1 holds two. The scan must stop
    // at Q3 and, with a single candidate there, auto-resolve.
    let mut docs = vec![doc(
        "Báo cáo tài chính hợp nhất quý 3 năm 2024",
        "https://x/fpt-q3-hn.pdf",
    )];
    docs.extend(fpt_q1_pair());
    let source = MockSource::new().with_listing("FPT", Some(2024), docs);
    let channel = Arc::new(ScriptedChannel::new([]));
    let engine = Baocao::builder()
        .with_source(Arc::new(source))
        .with_choice_channel(channel.clone())
        .build()
        .expect("engine builds");

    let request = quarterly(4);
    let id = request.request_id.clone();
    let report = engine
        .resolve_batch(intent(vec![request]))
        .await
        .expect("batch completes");

    assert_eq!(
        report.collected[&id],
        CollectedOutcome::Resolved {
            link: "https://x/fpt-q3-hn.pdf".to_string()
        }
    );
    assert_eq!(channel.calls(), 0);
}

#[tokio::test]
async fn exhausted_quarters_fail_with_a_fallback_specific_message() {
    let source = MockSource::new().with_listing(
        "FPT",
        Some(2024),
        vec![doc(
            "Báo cáo tài chính hợp nhất soát xét 6 tháng 2024",
            "https://x/hy.pdf",
        )],
    );
    let engine = engine_for(source);
    let request = quarterly(3);
    let id = request.request_id.clone();
    let report = engine
        .resolve_batch(intent(vec![request]))
        .await
        .expect("batch completes");

    let CollectedOutcome::Failed { reason } = &report.collected[&id] else {
        panic!("expected failure");
    };
    assert!(reason.contains("quarter 3"), "reason: {reason}");
    assert!(reason.contains("earlier quarter"), "reason: {reason}");
}

#[tokio::test]
async fn latest_with_explicit_status_scans_the_raw_listing() {
    let source = MockSource::new().with_listing(
        "VCB",
        None,
        vec![
            doc("BCTC hợp nhất quý 3 năm 2024", "https://x/vcb-hn.pdf"),
            doc("BCTC công ty mẹ quý 3 năm 2024", "https://x/vcb-me.pdf"),
        ],
    );
    let engine = engine_for(source);
    let request =
        ReportRequest::latest("VCB").with_consolidation(Consolidation::ParentOnly);
    let id = request.request_id.clone();
    let report = engine
        .resolve_batch(intent(vec![request]))
        .await
        .expect("batch completes");

    assert_eq!(
        report.collected[&id],
        CollectedOutcome::Resolved {
            link: "https://x/vcb-me.pdf".to_string()
        }
    );
}
