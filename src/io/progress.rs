//! Progress display for a generation run

use crate::algorithm::executor::{GenerationStats, StepOutcome};
use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    let template = format!(
        "[{{elapsed_precise}}] {{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
    );
    ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Tracks collapsed cells against the volume size
pub struct GenerationProgress {
    bar: ProgressBar,
}

impl GenerationProgress {
    /// Create a bar for `total_cells`; a quiet bar draws nothing
    pub fn new(total_cells: usize, quiet: bool) -> Self {
        let bar = ProgressBar::new(total_cells as u64);
        if quiet {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(PROGRESS_STYLE.clone());
        bar.set_prefix("cells");
        Self { bar }
    }

    /// Reflect the driver state after one step
    pub fn record(&self, outcome: StepOutcome, collapsed: usize, stats: GenerationStats) {
        self.bar.set_position(collapsed as u64);
        match outcome {
            StepOutcome::RegionRetried { region, attempt } => {
                self.bar
                    .set_message(format!("region {region} retry {attempt}"));
            }
            StepOutcome::RegionComplete { region } => {
                self.bar.set_message(format!(
                    "region {region} done, {} retries",
                    stats.retries
                ));
            }
            StepOutcome::Seeded { .. } | StepOutcome::Collapsed { .. } | StepOutcome::Done => {}
        }
    }

    /// Current position, the number of collapsed cells last reported
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Total the bar counts towards
    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    /// Close the bar with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}
