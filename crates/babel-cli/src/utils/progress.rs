use babelrun::engine::progress::StepStatus;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// Terminal rendering of an optimisation's step events.
///
/// Starts as a spinner (obabel has not yet printed its step budget) and turns
/// into a bar once the first status arrives.
pub struct OptimizationProgress {
    pb: ProgressBar,
}

impl OptimizationProgress {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(None, target)
            .with_style(Self::spinner_style())
            .with_message("Preparing force field...");
        pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        Self { pb }
    }

    pub fn update(&self, status: &StepStatus) {
        if self.pb.length() != Some(u64::from(status.max_steps)) {
            self.pb.disable_steady_tick();
            self.pb.set_style(Self::bar_style());
            self.pb.set_length(u64::from(status.max_steps));
        }
        self.pb.set_position(u64::from(status.step));
        self.pb.set_message(format!(
            "E = {:.4} (dE = {:+.4})",
            status.energy,
            status.energy - status.last_energy
        ));
    }

    pub fn finish(&self) {
        self.pb.disable_steady_tick();
        self.pb.finish_with_message("✓ Done");
    }

    pub fn abandon(&self, reason: &str) {
        self.pb.disable_steady_tick();
        self.pb.abandon_with_message(reason.to_string());
    }

    #[cfg(test)]
    pub fn step_budget(&self) -> Option<u64> {
        self.pb.length()
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<32} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "elapsed",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.elapsed().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for OptimizationProgress {
    fn default() -> Self {
        Self::new()
    }
}
