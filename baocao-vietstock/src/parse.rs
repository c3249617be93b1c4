use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use baocao_core::{BaocaoError, ReportDocument};

use crate::SOURCE_NAME;

/// Listing rows end with the posting timestamp, e.g. `20/07/2024 15:30`.
static POSTED_AT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\d{2}/\d{2}/\d{4}\s+\d{2}:\d{2}\s*$").expect("valid timestamp pattern")
});

const ROW_SELECTOR: &str = "div.p-t-xs p.i-b-d a";

/// Extract the listed documents from a listing page, in page order.
///
/// Titles are trimmed of the trailing posting timestamp; hrefs are resolved
/// against `base` so the engine only ever sees absolute links. Anchors
/// without an href or with an empty title are skipped.
pub(crate) fn parse_listing(html: &str, base: &Url) -> Result<Vec<ReportDocument>, BaocaoError> {
    let selector = Selector::parse(ROW_SELECTOR)
        .map_err(|e| BaocaoError::source(SOURCE_NAME, format!("bad row selector: {e}")))?;
    let page = Html::parse_document(html);

    let mut documents = Vec::new();
    for anchor in page.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if href.is_empty() {
            continue;
        }
        let raw_title: String = anchor.text().collect();
        let title = POSTED_AT.replace(raw_title.trim(), "").into_owned();
        if title.is_empty() {
            continue;
        }
        let link = base
            .join(href)
            .map_err(|e| BaocaoError::source(SOURCE_NAME, format!("bad document link: {e}")))?;
        documents.push(ReportDocument::new(title, link));
    }
    Ok(documents)
}
