use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Consolidation, ReportDocument};

/// Lower-cased title marker for the reviewed half-year report.
const REVIEWED_MARKER: &str = "soát xét";
/// Lower-cased title marker for the audited full-year report.
const AUDITED_MARKER: &str = "kiểm toán";

const EMPTY: &[ReportDocument] = &[];

/// Classification axis of the grid: a concrete reporting period.
///
/// Unlike [`crate::ReportPeriod`] this carries the quarter number and has no
/// `Latest` arm; the latest lookup bypasses the grid entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKey {
    /// Audited full-year report.
    FullYear,
    /// Reviewed half-year report.
    HalfYear,
    /// Quarterly report for the given quarter (`1..=4`).
    Quarter(u8),
}

impl PeriodKey {
    fn index(self) -> Option<usize> {
        match self {
            Self::FullYear => Some(0),
            Self::HalfYear => Some(1),
            Self::Quarter(q @ 1..=4) => Some(1 + q as usize),
            Self::Quarter(_) => None,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullYear => f.write_str("full-year"),
            Self::HalfYear => f.write_str("half-year"),
            Self::Quarter(q) => write!(f, "quarter {q}"),
        }
    }
}

const fn consolidation_index(status: Consolidation) -> usize {
    match status {
        Consolidation::Consolidated => 0,
        Consolidation::ParentOnly => 1,
    }
}

/// Fixed table of classified documents keyed by `(PeriodKey, Consolidation)`.
///
/// Built once per fetch by [`classify`], read-only afterwards, and discarded
/// when the request's resolution ends. Within a bucket, documents keep scrape
/// order: index 0 is the first (most recent) listing returned by the source.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportGrid {
    cells: [[Vec<ReportDocument>; 2]; 6],
}

impl ReportGrid {
    /// All documents classified into the given bucket, in scrape order.
    ///
    /// An out-of-range quarter yields the empty bucket.
    #[must_use]
    pub fn bucket(&self, period: PeriodKey, status: Consolidation) -> &[ReportDocument] {
        period
            .index()
            .map_or(EMPTY, |p| self.cells[p][consolidation_index(status)].as_slice())
    }

    /// First (most recent) document in the given bucket, if any.
    #[must_use]
    pub fn first(&self, period: PeriodKey, status: Consolidation) -> Option<&ReportDocument> {
        self.bucket(period, status).first()
    }

    /// Whether no document was classified at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|bucket| bucket.is_empty()))
    }

    fn push(&mut self, period: PeriodKey, status: Consolidation, document: ReportDocument) {
        if let Some(p) = period.index() {
            self.cells[p][consolidation_index(status)].push(document);
        }
    }
}

/// Bucket raw listing documents into a [`ReportGrid`].
///
/// Inference runs on the lower-cased title, in this precedence: a reviewed
/// marker wins over an audited marker, which wins over a `quý N` quarter
/// marker; titles matching none are dropped. A title carries
/// [`Consolidation::Consolidated`] iff it contains that status marker,
/// otherwise it defaults to parent-only. Pure function of its input.
#[must_use]
pub fn classify(documents: &[ReportDocument]) -> ReportGrid {
    let mut grid = ReportGrid::default();
    for document in documents {
        let title = document.title.to_lowercase();
        let period = if title.contains(REVIEWED_MARKER) {
            Some(PeriodKey::HalfYear)
        } else if title.contains(AUDITED_MARKER) {
            Some(PeriodKey::FullYear)
        } else {
            (1u8..=4)
                .find(|q| title.contains(&format!("quý {q}")))
                .map(PeriodKey::Quarter)
        };
        let Some(period) = period else { continue };
        let status = if title.contains(Consolidation::Consolidated.marker()) {
            Consolidation::Consolidated
        } else {
            Consolidation::ParentOnly
        };
        grid.push(period, status, document.clone());
    }
    grid
}
