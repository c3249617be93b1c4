mod helpers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use baocao::{Baocao, Step};
use baocao_core::{
    AnalysisIntent, BaocaoError, Consolidation, DocumentSource, ReportDocument, ReportPeriod,
    ReportRequest, RequestId,
};
use baocao_mock::MockSource;
use helpers::{doc, fpt_q2_pair};

fn quarterly(code: &str, quarter: u8) -> ReportRequest {
    ReportRequest::new(code, ReportPeriod::Quarter)
        .with_year(2024)
        .with_quarter(quarter)
}

fn intent(requests: Vec<ReportRequest>) -> AnalysisIntent {
    AnalysisIntent {
        requests,
        comparison_context: "Integration run.".to_string(),
    }
}

#[tokio::test]
async fn every_request_yields_exactly_one_outcome() {
    let source = MockSource::new()
        .with_listing("FPT", Some(2024), fpt_q2_pair())
        .with_listing("EMPTY", Some(2024), vec![])
        .with_timeout("GONE");
    let engine = Baocao::builder()
        .with_source(Arc::new(source))
        .build()
        .expect("engine builds");

    let requests = vec![
        quarterly("FPT", 2).with_consolidation(Consolidation::Consolidated),
        quarterly("GONE", 2),
        quarterly("EMPTY", 2),
    ];
    let ids: Vec<RequestId> = requests.iter().map(|r| r.request_id.clone()).collect();

    let report = engine
        .resolve_batch(intent(requests))
        .await
        .expect("batch completes");

    assert_eq!(report.collected.len(), 3);
    assert!(ids.iter().all(|id| report.collected.contains_key(id)));
    assert!(!report.collected[&ids[0]].is_failure());
    assert!(report.collected[&ids[1]].is_failure());
    assert!(report.collected[&ids[2]].is_failure());
}

#[tokio::test]
async fn one_failure_never_aborts_the_batch() {
    let source = MockSource::new()
        .with_timeout("GONE")
        .with_listing("FPT", Some(2024), fpt_q2_pair());
    let engine = Baocao::builder()
        .with_source(Arc::new(source))
        .build()
        .expect("engine builds");

    // The failing request comes first; the following one must still resolve.
    let ok = quarterly("FPT", 2).with_consolidation(Consolidation::ParentOnly);
    let ok_id = ok.request_id.clone();
    let report = engine
        .resolve_batch(intent(vec![quarterly("GONE", 1), ok]))
        .await
        .expect("batch completes");

    assert_eq!(
        report.collected[&ok_id],
        baocao_core::CollectedOutcome::Resolved {
            link: "https://x/fpt-q2-me.pdf".to_string()
        }
    );
}

#[tokio::test]
async fn empty_listing_fails_with_a_ticker_and_year_message() {
    let source = MockSource::new().with_listing("FPT", Some(2024), vec![]);
    let engine = Baocao::builder()
        .with_source(Arc::new(source))
        .build()
        .expect("engine builds");

    let request = quarterly("FPT", 2);
    let id = request.request_id.clone();
    let report = engine
        .resolve_batch(intent(vec![request]))
        .await
        .expect("batch completes");

    let baocao_core::CollectedOutcome::Failed { reason } = &report.collected[&id] else {
        panic!("expected failure");
    };
    assert!(reason.contains("FPT"), "reason: {reason}");
    assert!(reason.contains("2024"), "reason: {reason}");
}

struct NeverAnswers;

#[async_trait]
impl DocumentSource for NeverAnswers {
    fn name(&self) -> &'static str {
        "never-answers"
    }

    async fn fetch(
        &self,
        _stock_code: &str,
        _year: Option<i32>,
    ) -> Result<Vec<ReportDocument>, BaocaoError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(vec![])
    }
}

#[tokio::test(start_paused = true)]
async fn hung_acquisition_is_bounded_by_the_source_timeout() {
    let engine = Baocao::builder()
        .with_source(Arc::new(NeverAnswers))
        .source_timeout(Duration::from_millis(100))
        .build()
        .expect("engine builds");

    let request = quarterly("FPT", 2);
    let id = request.request_id.clone();
    let report = engine
        .resolve_batch(intent(vec![request]))
        .await
        .expect("batch completes");

    let baocao_core::CollectedOutcome::Failed { reason } = &report.collected[&id] else {
        panic!("expected failure");
    };
    assert!(reason.contains("no listing found"), "reason: {reason}");
}

#[tokio::test]
async fn per_iteration_state_is_reset_between_requests() {
    let source = MockSource::new().with_listing("FPT", Some(2024), fpt_q2_pair());
    let engine = Baocao::builder()
        .with_source(Arc::new(source))
        .build()
        .expect("engine builds");

    let ambiguous = quarterly("FPT", 2);
    let failing = quarterly("GONE", 1);
    let failing_id = failing.request_id.clone();
    let mut run = engine.start_batch(intent(vec![ambiguous, failing]));

    let Step::AwaitingChoice { choices, .. } = engine.advance(&mut run).await else {
        panic!("expected a clarification park");
    };
    assert_eq!(choices.len(), 2);
    run.resume(1).expect("valid selection");
    assert!(run.prompt().is_none());
    assert!(run.current().is_none());

    // The next iteration must not see any leftover prompt or choices.
    assert_eq!(engine.advance(&mut run).await, Step::Done);
    assert!(run.is_done());
    let report = run.into_report();
    assert!(report.collected[&failing_id].is_failure());
}

#[tokio::test]
async fn latest_requests_fetch_without_a_year_filter() {
    // Only the unfiltered listing is scripted: a year-scoped fetch for this
    // ticker would fail, so success proves the year constraint was dropped.
    let source = MockSource::new().with_listing(
        "VCB",
        None,
        vec![doc("BCTC hợp nhất quý 3 năm 2024", "https://x/vcb-latest.pdf")],
    );
    let engine = Baocao::builder()
        .with_source(Arc::new(source))
        .build()
        .expect("engine builds");

    let request = ReportRequest::latest("vcb");
    let id = request.request_id.clone();
    let report = engine
        .resolve_batch(intent(vec![request]))
        .await
        .expect("batch completes");

    assert_eq!(
        report.collected[&id],
        baocao_core::CollectedOutcome::Resolved {
            link: "https://x/vcb-latest.pdf".to_string()
        }
    );
}

#[tokio::test]
async fn parked_run_survives_a_serialization_round_trip() {
    let source = MockSource::new().with_listing("FPT", Some(2024), fpt_q2_pair());
    let engine = Baocao::builder()
        .with_source(Arc::new(source))
        .build()
        .expect("engine builds");

    let request = quarterly("FPT", 2);
    let id = request.request_id.clone();
    let mut run = engine.start_batch(intent(vec![request]));
    let Step::AwaitingChoice { .. } = engine.advance(&mut run).await else {
        panic!("expected a clarification park");
    };

    let persisted = serde_json::to_string(&run).expect("serializes");
    let mut restored: baocao::BatchRun = serde_json::from_str(&persisted).expect("deserializes");

    restored.resume(2).expect("valid selection");
    assert_eq!(engine.advance(&mut restored).await, Step::Done);
    let report = restored.into_report();
    assert_eq!(
        report.collected[&id],
        baocao_core::CollectedOutcome::Resolved {
            link: "https://x/fpt-q2-me.pdf".to_string()
        }
    );
}
