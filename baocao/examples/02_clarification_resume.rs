use std::io::{BufRead, Write};
use std::sync::Arc;

use baocao::{Baocao, Step};
use baocao_core::{AnalysisIntent, ReportDocument, ReportPeriod, ReportRequest};
use baocao_mock::MockSource;

/// Drives the suspend/resume protocol by hand: the engine parks on a
/// clarification and this loop plays the external actor over stdin.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
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
        ],
    );
    let engine = Baocao::builder().with_source(Arc::new(source)).build()?;

    let intent = AnalysisIntent {
        requests: vec![
            ReportRequest::new("FPT", ReportPeriod::Quarter)
                .with_year(2024)
                .with_quarter(2),
        ],
        comparison_context: "Analyze FPT's Q2 2024 report.".to_string(),
    };

    let mut run = engine.start_batch(intent);
    loop {
        match engine.advance(&mut run).await {
            Step::Done => break,
            Step::AwaitingChoice { prompt, .. } => {
                println!("{prompt}");
                loop {
                    print!("Enter your selection (number): ");
                    std::io::stdout().flush()?;
                    let mut line = String::new();
                    std::io::stdin().lock().read_line(&mut line)?;
                    let Ok(selection) = line.trim().parse::<usize>() else {
                        println!("Please enter a number.");
                        continue;
                    };
                    match run.resume(selection) {
                        Ok(()) => break,
                        Err(err) => println!("{err}"),
                    }
                }
            }
        }
    }

    println!("{}", run.into_report().summary());
    Ok(())
}
