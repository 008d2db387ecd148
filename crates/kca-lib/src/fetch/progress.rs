use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::fmt::Write;

/// Total columns of the bar, pre-filled part included.
pub const BAR_WIDTH: usize = 20;

const LABEL_WIDTH: usize = 35;

/// Number of bar columns covered by bytes that were on disk before the
/// download started: `on_disk / (expected / BAR_WIDTH)`.
pub fn initial_fill(on_disk_size: u64, expected_size: u64) -> usize {
    if expected_size == 0 {
        return 0;
    }
    let fill = u128::from(on_disk_size) * BAR_WIDTH as u128 / u128::from(expected_size);
    (fill as usize).min(BAR_WIDTH)
}

/// Creates the bar for one download session.
///
/// The pre-filled columns are baked into the template and never move. The live
/// part of the bar only tracks bytes streamed in this session, while the
/// percentage is computed against the whole file.
pub fn download_progress_bar(label: &str, on_disk_size: u64, expected_size: u64) -> ProgressBar {
    let remaining = expected_size.saturating_sub(on_disk_size);
    let bar = ProgressBar::with_draw_target(Some(remaining), ProgressDrawTarget::stderr());
    bar.set_style(download_style(on_disk_size, expected_size));
    bar.set_prefix(label.to_string());
    bar
}

fn download_template(on_disk_size: u64, expected_size: u64) -> String {
    let filled = initial_fill(on_disk_size, expected_size);
    let live_width = (BAR_WIDTH - filled).max(1);
    format!(
        "{{prefix:>{LABEL_WIDTH}.green}} [{}{{bar:{live_width}}}] {{total_percent}}|{{elapsed_precise}}<{{eta_precise}}",
        "#".repeat(filled)
    )
}

fn download_style(on_disk_size: u64, expected_size: u64) -> ProgressStyle {
    ProgressStyle::with_template(&download_template(on_disk_size, expected_size))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("# ")
        .with_key(
            "total_percent",
            move |state: &ProgressState, w: &mut dyn Write| {
                let done = on_disk_size.saturating_add(state.pos());
                let percent = match expected_size {
                    0 => 100,
                    expected => (done.saturating_mul(100) / expected).min(100),
                };
                let _ = write!(w, "{percent:>3}%");
            },
        )
}
