//! Helpers shared by the pipeline reports and the CLI output.
use crate::constants::{PROGRESS_BAR_TEMPLATE, PROGRESS_SPINNER_TEMPLATE};
use crate::logger::is_quiet;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Whole bytes below 1 KB, two decimals above (e.g. "512 B", "1.50 KB")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    const THRESHOLD: f64 = 1024.0;

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Percentage saved going from `before` to `after`
///
/// # Arguments
/// * `before` - Size of the original bytes
/// * `after` - Size of the bytes that were uploaded
///
/// # Returns
/// * One decimal place (e.g. "40.0%"), negative when the output grew, and
///   `"0%"` when there was nothing to begin with
pub fn savings_percent(before: u64, after: u64) -> String {
    if before == 0 {
        return "0%".to_string();
    }
    let savings = (before as f64 - after as f64) / before as f64 * 100.0;
    format!("{:.1}%", savings)
}

fn hide_when_quiet(pb: &ProgressBar) {
    if is_quiet() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
}

/// Create a progress spinner with consistent styling
///
/// # Arguments
/// * `message` - Initial message to display
///
/// # Returns
/// * Configured `ProgressBar` instance, drawing nothing under `--quiet`
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    hide_when_quiet(&pb);
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Create a progress bar for a batch run
///
/// # Arguments
/// * `len` - Number of items in the batch
///
/// # Returns
/// * Configured `ProgressBar` instance, drawing nothing under `--quiet`
pub fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    hide_when_quiet(&pb);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
        pb.set_style(style);
    }
    pb
}
