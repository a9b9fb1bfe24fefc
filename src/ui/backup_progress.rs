// linkback is an incremental backup tool
// Copyright (C) 2025  Javier Lancha Vázquez <javier.lancha@gmail.com>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};

use crate::{global, utils};

/// Spinner showing the number of processed entries and the bytes copied so far.
///
/// Only drawn at the default verbosity. With higher verbosity every entry is
/// already printed on its own line, and with `--quiet` nothing should be.
pub struct BackupProgress {
    spinner: ProgressBar,
}

impl BackupProgress {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();

        if global::verbosity() == 1 {
            spinner.set_draw_target(ProgressDrawTarget::stderr_with_hz(4));
        } else {
            spinner.set_draw_target(ProgressDrawTarget::hidden());
        }

        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{custom_elapsed}] {pos} entries, {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .with_key(
                    "custom_elapsed",
                    |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                        let _ = w.write_str(&utils::pretty_print_duration(state.elapsed()));
                    },
                ),
        );
        spinner.enable_steady_tick(Duration::from_millis(250));

        Self { spinner }
    }

    /// Advances the entry count. `total_copied_bytes` is the running total.
    pub fn processed(&self, total_copied_bytes: u64) {
        self.spinner.inc(1);
        self.spinner.set_message(format!(
            "{} copied",
            utils::format_size(total_copied_bytes)
        ));
    }

    /// Runs `f` with the spinner hidden so that log lines don't get mixed with it.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.spinner.suspend(f)
    }

    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Default for BackupProgress {
    fn default() -> Self {
        Self::new()
    }
}
