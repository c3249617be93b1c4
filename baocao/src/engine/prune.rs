use chrono::NaiveDate;

use baocao_core::{ReportPeriod, ReportRequest};

/// Split `requests` into (ready, future-dated) against `today`.
///
/// A request is future-dated when its reporting period ends after `today`:
/// such a report cannot exist yet, so it is dropped before queueing and
/// surfaced in the batch notification instead of failing downstream.
/// Requests without a computable period end (`Latest`, or a missing year)
/// are always kept.
pub(crate) fn split_future(
    requests: Vec<ReportRequest>,
    today: NaiveDate,
) -> (Vec<ReportRequest>, Vec<ReportRequest>) {
    requests
        .into_iter()
        .partition(|request| period_end(request).is_none_or(|end| end <= today))
}

/// Short human label for a skipped request, e.g. `FPT quarter 4 2025`.
pub(crate) fn describe(request: &ReportRequest) -> String {
    let period = match (request.period, request.quarter) {
        (ReportPeriod::Quarter, Some(quarter)) => format!("quarter {quarter}"),
        (period, _) => period.to_string(),
    };
    match request.year {
        Some(year) => format!("{} {period} {year}", request.normalized_code()),
        None => format!("{} {period}", request.normalized_code()),
    }
}

fn period_end(request: &ReportRequest) -> Option<NaiveDate> {
    let year = request.year?;
    let (month, day) = match request.period {
        ReportPeriod::Latest => return None,
        ReportPeriod::FullYear => (12, 31),
        ReportPeriod::HalfYear => (6, 30),
        ReportPeriod::Quarter => match request.quarter? {
            1 => (3, 31),
            2 => (6, 30),
            3 => (9, 30),
            4 => (12, 31),
            _ => return None,
        },
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quarterly(code: &str, year: i32, quarter: u8) -> ReportRequest {
        ReportRequest::new(code, ReportPeriod::Quarter)
            .with_year(year)
            .with_quarter(quarter)
    }

    #[test]
    fn requests_ending_after_today_are_split_out() {
        let today = NaiveDate::from_ymd_opt(2024, 10, 1).expect("valid date");
        let (ready, skipped) = split_future(
            vec![
                quarterly("FPT", 2024, 2),
                quarterly("FPT", 2024, 4),
                ReportRequest::latest("VCB"),
            ],
            today,
        );
        assert_eq!(ready.len(), 2);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].quarter, Some(4));
    }

    #[test]
    fn period_end_day_is_still_ready() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date");
        let (ready, skipped) = split_future(
            vec![ReportRequest::new("FPT", ReportPeriod::HalfYear).with_year(2024)],
            today,
        );
        assert_eq!(ready.len(), 1);
        assert!(skipped.is_empty());
    }

    #[test]
    fn describe_names_the_quarter() {
        assert_eq!(describe(&quarterly("fpt", 2025, 3)), "FPT quarter 3 2025");
        assert_eq!(describe(&ReportRequest::latest("vcb")), "VCB latest");
    }
}
