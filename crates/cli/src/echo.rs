use owo_colors::OwoColorize;
use trailmark_core::{BatchReport, WalkRecord};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Trailmark".bold().bright_green(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Walking-route pages to normalized walk records\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a labelled value under a step
pub fn print_field(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print the classified features of a record
pub fn print_record_details(record: &WalkRecord) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", record.title.bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_field("Slug", &record.slug);
    print_field("Region", &record.region_slug);
    print_field("Difficulty", record.difficulty.as_str());
    print_field("Walk type", &format!("{:?}", record.walk_type));
    print_field("Route", &format!("{:?}", record.route_type));
    print_field("Distance", &format!("{:.1} km", record.distance));
    print_field("Stages", &record.stages.len().to_string());
    let tags: Vec<&str> = record.tags.iter().map(|tag| tag.as_str()).collect();
    print_field("Tags", &tags.join(", "));
    eprintln!();
}

/// Print a batch summary, with one warning per skipped input
pub fn print_report(report: &BatchReport) {
    for failure in &report.failures {
        print_warning(&failure.to_string());
    }
    let message = format!("{} records, {} skipped", report.records.len(), report.failures.len());
    if report.failures.is_empty() { print_success(&message) } else { print_info(&message) }
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
