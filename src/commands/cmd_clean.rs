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

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::{
    backend::{localfs::LocalFS, make_dry_backend},
    platform,
    repository::{Repository, classifier::Classifier, lock::TargetLock},
    retention::{self, CleanSummary},
    ui, utils,
};

use super::GlobalArgs;

#[derive(Args, Debug)]
#[clap(about = "Remove the snapshots that the retention policy does not keep")]
pub struct CmdArgs {
    /// Report what would be removed without removing anything
    #[clap(short = 'n', long, default_value_t = false)]
    pub dry_run: bool,
}

pub fn run(global_args: &GlobalArgs, args: &CmdArgs) -> Result<()> {
    let loaded = super::load_config(global_args)?;
    let backend = make_dry_backend(Arc::new(LocalFS::new(platform::native())), args.dry_run);
    let classifier = Classifier::new(loaded.config.first_day_of_week);

    if args.dry_run {
        ui::cli::log!("{}", "Dry run: nothing will be removed".bold().yellow());
    }

    for backup in &loaded.config.backups {
        let target = backup.target_path(&loaded.dir);
        ui::cli::log!();
        ui::cli::log!("{} \'{}\'", "Cleaning".bold().cyan(), target.display());

        let repo = Repository::open(&target)?;
        let _lock = match args.dry_run {
            true => None,
            false => Some(TargetLock::acquire(&target)?),
        };

        let leftovers = retention::sweep_leftovers(&repo, backend.as_ref())?;
        if leftovers > 0 {
            ui::cli::log!(
                "Removed {} of an interrupted cleanup",
                utils::format_count(leftovers as u64, "leftover", "leftovers")
            );
        }

        let set = repo.load(&classifier)?;
        let summary = retention::clean(&set, &backup.quotas(), backend.as_ref());
        show_summary(&summary, args.dry_run);
    }

    Ok(())
}

pub(crate) fn show_summary(summary: &CleanSummary, dry_run: bool) {
    let removed = utils::format_count(summary.removed as u64, "snapshot", "snapshots");
    if dry_run {
        ui::cli::log!("{} would be removed, {} kept", removed, summary.kept);
    } else {
        ui::cli::log!("{} removed, {} kept", removed, summary.kept);
    }

    if summary.failed > 0 {
        ui::cli::error!(
            "{} could not be removed",
            utils::format_count(summary.failed as u64, "snapshot", "snapshots")
        );
    }
}
