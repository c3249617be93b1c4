#![allow(dead_code)]

use baocao_core::ReportDocument;

pub fn doc(title: &str, link: &str) -> ReportDocument {
    ReportDocument::new(title, link)
}

/// One consolidated and one parent-only Q2 2024 listing for FPT, the
/// canonical ambiguous pair.
pub fn fpt_q2_pair() -> Vec<ReportDocument> {
    vec![
        doc(
            "Báo cáo tài chính hợp nhất quý 2 năm 2024",
            "https://x/fpt-q2-hn.pdf",
        ),
        doc(
            "Báo cáo tài chính công ty mẹ quý 2 năm 2024",
            "https://x/fpt-q2-me.pdf",
        ),
    ]
}

pub fn fpt_q1_pair() -> Vec<ReportDocument> {
    vec![
        doc(
            "Báo cáo tài chính hợp nhất quý 1 năm 2024",
            "https://x/fpt-q1-hn.pdf",
        ),
        doc(
            "Báo cáo tài chính công ty mẹ quý 1 năm 2024",
            "https://x/fpt-q1-me.pdf",
        ),
    ]
}
