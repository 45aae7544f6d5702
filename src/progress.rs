//! Per-file progress bars drawn on stderr while the inputs are classified.
use indicatif::{ProgressBar, ProgressStyle};

use crate::membership::Side;

const TEMPLATE: &str = "{prefix} [{bar:40}] {percent}% {pos}/{len}";

/// Build a bar for one input file with `total` physical lines.
pub fn file_bar(side: Side, total: u64) -> ProgressBar {
    let style = ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    let number = match side {
        Side::First => 1,
        Side::Second => 2,
    };
    ProgressBar::new(total)
        .with_style(style)
        .with_prefix(format!("Processing file {number}..."))
}
