use owo_colors::OwoColorize;
use plainpage_core::CleanReport;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "Plainpage".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Simplified, accessible web pages\n".dimmed());
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
pub fn print_detail(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print the per-stage removal counts of a cleaning run
pub fn print_report(report: &CleanReport) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Cleaning Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());

    let rows = [
        ("Headers removed", report.headers_removed),
        ("Headers kept", report.headers_kept),
        ("Footers removed", report.footers_removed),
        ("Elements pruned", report.elements_pruned),
        ("Scripts removed", report.scripts_removed),
        ("Scripts kept", report.scripts_kept),
        ("Hidden (aria) removed", report.aria_hidden_removed),
        ("Hidden (display) removed", report.display_none_removed),
        ("Attributes stripped", report.attributes_stripped),
        ("Empty containers removed", report.empty_removed),
    ];
    for (label, count) in rows {
        eprintln!("  {} {:>6}", format!("{:<26}", format!("{}:", label)).dimmed(), count.bright_white());
    }
    eprintln!(
        "  {} {:>6}\n",
        format!("{:<26}", "Total elements removed:").bold().dimmed(),
        report.elements_removed()
    );
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
