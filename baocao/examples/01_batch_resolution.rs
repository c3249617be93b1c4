use std::sync::Arc;

use baocao::Baocao;
use baocao_core::{AnalysisIntent, Consolidation, ReportDocument, ReportPeriod, ReportRequest};
use baocao_mock::{MockSource, ScriptedChannel};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // 1. Script a deterministic listing for FPT's 2024 filings.
    let source = MockSource::new().with_listing(
        "FPT",
        Some(2024),
        vec![
            ReportDocument::new(
                "Báo cáo tài chính hợp nhất quý 2 năm 2024",
                "https://finance.vietstock.vn/data/fpt_q2_hn.pdf",
            ),
            ReportDocument::new(
                "Báo cáo tài chính công ty mẹ quý 2 năm 2024",
                "https://finance.vietstock.vn/data/fpt_q2_me.pdf",
            ),
            ReportDocument::new(
                "Báo cáo tài chính hợp nhất năm 2023 đã kiểm toán",
                "https://finance.vietstock.vn/data/fpt_fy23_hn.pdf",
            ),
        ],
    );

    // 2. Build the engine; the scripted channel answers "1" if asked.
    let engine = Baocao::builder()
        .with_source(Arc::new(source))
        .with_choice_channel(Arc::new(ScriptedChannel::new([1])))
        .build()?;

    // 3. Two requests: one fully constrained, one ambiguous on consolidation.
    let intent = AnalysisIntent {
        requests: vec![
            ReportRequest::new("FPT", ReportPeriod::Quarter)
                .with_year(2024)
                .with_quarter(2)
                .with_consolidation(Consolidation::Consolidated),
            ReportRequest::new("FPT", ReportPeriod::Quarter)
                .with_year(2024)
                .with_quarter(2),
        ],
        comparison_context: "Compare FPT's consolidated and parent-only Q2 2024 reports."
            .to_string(),
    };

    // 4. Resolve the batch; clarifications are settled by the channel.
    let report = engine.resolve_batch(intent).await?;

    // 5. Print the rendered summary.
    println!("{}", report.summary());

    Ok(())
}
