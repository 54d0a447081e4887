use crate::migrate::MigrationReport;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Count")]
    count: String,
}

/// Render labeled counts as a terminal table
pub fn counts_table(counts: &[(&str, usize)]) -> String {
    let rows: Vec<CountRow> = counts
        .iter()
        .map(|(label, count)| CountRow {
            metric: label.to_string(),
            count: count.to_string(),
        })
        .collect();
    if rows.is_empty() {
        return String::new();
    }
    Table::new(&rows).with(Style::rounded()).to_string()
}

/// Render a migration report as a terminal table
pub fn report_table(report: &MigrationReport) -> String {
    counts_table(&[
        ("Total processed", report.total_processed),
        ("Migrated", report.migrated_count),
        ("Skipped", report.skipped_count),
        ("Errors", report.error_count),
        ("Direct", report.per_bucket.direct),
        ("Inverse", report.per_bucket.inverse),
        ("Indirect", report.per_bucket.indirect),
        ("Self", report.per_bucket.self_ref),
    ])
}
