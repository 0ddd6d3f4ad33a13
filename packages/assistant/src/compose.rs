//! Response text composition.
//!
//! Markdown summaries live here so branch logic in `lib.rs` stays about
//! control flow, not string assembly.

use civic_lens_models::{LocationInfo, ReportRecord, ReportStatus};

/// Markdown status summary for a tracked report.
#[must_use]
pub fn format_report_summary(report: &ReportRecord) -> String {
    let status = match report.status {
        ReportStatus::Pending => "Pending",
        ReportStatus::InProgress => "In Progress",
        ReportStatus::Resolved => "Resolved",
        ReportStatus::Dismissed => "Dismissed",
    };
    let location = report.location.as_deref().unwrap_or("Not specified");

    format!(
        "**Report #{id}**\n\n\
         **Status:** {status}\n\
         **Type:** {report_type}\n\
         **Title:** {title}\n\
         **Location:** {location}\n\
         **Created:** {created}",
        id = report.report_id,
        report_type = report.specific_type.to_uppercase(),
        title = report.title,
        created = report.created_at,
    )
}

/// "City, State, Country" with missing parts omitted.
#[must_use]
pub fn location_summary(info: &LocationInfo) -> String {
    [&info.city, &info.state, &info.country]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect::<Vec<_>>()
        .join(", ")
}
