use baocao_core::{
    BaocaoError, Consolidation, PeriodKey, ReportChoice, ReportDocument, ReportGrid, ReportPeriod,
    ReportRequest, ResolutionOutcome,
};

/// Decide one request against its classification grid.
///
/// `documents` is the raw scrape in source order; only the `Latest` path
/// reads it, every year-scoped path goes through the grid.
pub(crate) fn resolve(
    request: &ReportRequest,
    grid: &ReportGrid,
    documents: &[ReportDocument],
) -> ResolutionOutcome {
    if request.period == ReportPeriod::Latest {
        return resolve_latest(request, documents);
    }
    let Some(year) = request.year else {
        return ResolutionOutcome::Failed(BaocaoError::invalid_arg(format!(
            "a year is required for {} requests",
            request.period
        )));
    };
    match request.consolidation {
        Some(status) => resolve_exact(request, grid, year, status),
        None => resolve_with_fallback(request, grid, year),
    }
}

/// Source order defines "latest": the first listing wins unless an explicit
/// consolidation status narrows the scan.
fn resolve_latest(request: &ReportRequest, documents: &[ReportDocument]) -> ResolutionOutcome {
    let code = request.normalized_code();
    let Some(first) = documents.first() else {
        return ResolutionOutcome::Failed(BaocaoError::NoDocuments {
            stock_code: code,
            year: None,
        });
    };
    match request.consolidation {
        Some(status) => documents
            .iter()
            .find(|doc| doc.title.to_lowercase().contains(status.marker()))
            .map_or_else(
                || {
                    ResolutionOutcome::Failed(BaocaoError::no_match(format!(
                        "latest {status} report for {code}"
                    )))
                },
                |doc| ResolutionOutcome::Resolved {
                    link: doc.link.clone(),
                    notification: Some(format!(
                        "Found the latest {status} report: '{}'.",
                        doc.title
                    )),
                },
            ),
        None => ResolutionOutcome::Resolved {
            link: first.link.clone(),
            notification: Some(format!(
                "Found the latest report: '{}'. Defaulted to the first listing.",
                first.title
            )),
        },
    }
}

/// An explicit consolidation status is a hard constraint: the exact bucket
/// either holds the answer or the request fails. No fallback runs here.
fn resolve_exact(
    request: &ReportRequest,
    grid: &ReportGrid,
    year: i32,
    status: Consolidation,
) -> ResolutionOutcome {
    let Some(key) = period_key(request) else {
        return ResolutionOutcome::Failed(BaocaoError::invalid_arg(
            "a quarter between 1 and 4 is required for quarterly requests",
        ));
    };
    match grid.first(key, status) {
        Some(doc) => ResolutionOutcome::Resolved {
            link: doc.link.clone(),
            notification: Some(format!("Found '{}' as requested.", doc.title)),
        },
        None => ResolutionOutcome::Failed(BaocaoError::no_match(format!(
            "{key} {status} report for {} in {year}",
            request.normalized_code()
        ))),
    }
}

/// Build the ordered candidate list for a request with no consolidation
/// constraint, then decide: fail on zero, auto-resolve on one, ask on more.
fn resolve_with_fallback(
    request: &ReportRequest,
    grid: &ReportGrid,
    year: i32,
) -> ResolutionOutcome {
    let mut choices: Vec<ReportChoice> = Vec::new();
    let mut missed_quarter: Option<u8> = None;

    if request.period == ReportPeriod::Quarter {
        let Some(quarter) = request.quarter else {
            return ResolutionOutcome::Failed(BaocaoError::invalid_arg(
                "a quarter between 1 and 4 is required for quarterly requests",
            ));
        };
        collect_quarter(grid, quarter, &mut choices);
        if choices.is_empty() {
            missed_quarter = Some(quarter);
            // Walk strictly backward and stop at the first non-empty quarter.
            for earlier in (1..quarter).rev() {
                collect_quarter(grid, earlier, &mut choices);
                if !choices.is_empty() {
                    break;
                }
            }
        }
    }

    // Period-level fallback never runs after a failed explicit-quarter search.
    if choices.is_empty() && missed_quarter.is_none() {
        for status in Consolidation::ALL {
            if request.period != ReportPeriod::FullYear
                && let Some(doc) = grid.first(PeriodKey::HalfYear, status)
            {
                choices.push(choice_from(PeriodKey::HalfYear, status, doc));
            }
            if request.period != ReportPeriod::HalfYear
                && let Some(doc) = grid.first(PeriodKey::FullYear, status)
            {
                choices.push(choice_from(PeriodKey::FullYear, status, doc));
            }
        }
    }

    match choices.len() {
        0 => ResolutionOutcome::Failed(match missed_quarter {
            Some(quarter) => BaocaoError::ExhaustedFallback { quarter, year },
            None => BaocaoError::NoPeriodMatch { year },
        }),
        1 => {
            let choice = &choices[0];
            let mut note = format!(
                "Only one matching report was found: '{}'. It was selected automatically.",
                choice.title
            );
            if let Some(quarter) = missed_quarter {
                note = format!("No quarter {quarter} report was found. {note}");
            }
            ResolutionOutcome::Resolved {
                link: choice.link.clone(),
                notification: Some(note),
            }
        }
        _ => ResolutionOutcome::NeedsClarification {
            prompt: clarification_prompt(request, year, missed_quarter, &choices),
            choices,
        },
    }
}

fn collect_quarter(grid: &ReportGrid, quarter: u8, choices: &mut Vec<ReportChoice>) {
    for status in Consolidation::ALL {
        if let Some(doc) = grid.first(PeriodKey::Quarter(quarter), status) {
            choices.push(choice_from(PeriodKey::Quarter(quarter), status, doc));
        }
    }
}

fn choice_from(period: PeriodKey, status: Consolidation, doc: &ReportDocument) -> ReportChoice {
    ReportChoice {
        period,
        consolidation: status,
        title: doc.title.clone(),
        link: doc.link.clone(),
    }
}

fn period_key(request: &ReportRequest) -> Option<PeriodKey> {
    match request.period {
        ReportPeriod::Quarter => match request.quarter {
            Some(q @ 1..=4) => Some(PeriodKey::Quarter(q)),
            _ => None,
        },
        ReportPeriod::HalfYear => Some(PeriodKey::HalfYear),
        ReportPeriod::FullYear => Some(PeriodKey::FullYear),
        ReportPeriod::Latest => None,
    }
}

fn clarification_prompt(
    request: &ReportRequest,
    year: i32,
    missed_quarter: Option<u8>,
    choices: &[ReportChoice],
) -> String {
    let mut prompt = match missed_quarter {
        Some(quarter) => format!(
            "No report was found for quarter {quarter} of {year}.\nThe closest earlier candidates are:\n"
        ),
        None => format!(
            "Found the following reports for {} in {year}:\n",
            request.normalized_code()
        ),
    };
    for (idx, choice) in choices.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", idx + 1, choice.title));
    }
    prompt.push_str("Which report should I use?");
    prompt
}
