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

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime, Timelike, Weekday};
use clap::Args;
use colored::Colorize;

use crate::{
    archiver::{ArchiveOptions, Archiver, BackupSummary},
    backend::{StorageBackend, localfs::LocalFS, make_dry_backend},
    config::BackupConfig,
    platform::{self, Platform},
    repository::{
        Repository,
        classifier::Classifier,
        lock::TargetLock,
        naming,
        snapshot::{Period, SnapshotKind, SnapshotRecord},
    },
    retention::{self, Quota, Quotas},
    ui::{
        self,
        table::{Alignment, Table},
    },
    utils,
};

use super::{GlobalArgs, LoadedConfig};

#[derive(Args, Debug)]
#[clap(about = "Create a new snapshot of every configured source")]
pub struct CmdArgs {
    /// Report what would be done without writing anything
    #[clap(short = 'n', long, default_value_t = false)]
    pub dry_run: bool,

    /// Create an on-demand snapshot, outside the periodic schedule
    #[clap(short = 'd', long, default_value_t = false)]
    pub on_demand: bool,

    /// Number of files processed in parallel [default: number of CPUs]
    #[clap(short = 'j', long, value_parser)]
    pub jobs: Option<usize>,
}

pub fn run(global_args: &GlobalArgs, args: &CmdArgs) -> Result<()> {
    let loaded = super::load_config(global_args)?;
    ui::cli::verbose_2!("Using configuration \'{}\'", loaded.path.display());

    let platform = platform::native();
    let backend = make_dry_backend(Arc::new(LocalFS::new(platform.clone())), args.dry_run);

    if args.dry_run {
        ui::cli::log!("{}", "Dry run: nothing will be written".bold().yellow());
    }

    for backup in &loaded.config.backups {
        backup_one(&loaded, backup, platform.as_ref(), backend.clone(), args)?;
    }

    Ok(())
}

fn backup_one(
    loaded: &LoadedConfig,
    backup: &BackupConfig,
    platform: &dyn Platform,
    backend: Arc<dyn StorageBackend>,
    args: &CmdArgs,
) -> Result<()> {
    // Exclusions are matched by path, so symlinks must be resolved first.
    let source = canonical_dir(&backup.source_path(&loaded.dir), "Source")?;
    let target = canonical_dir(&backup.target_path(&loaded.dir), "Backup target")?;
    if source == target {
        bail!(
            "Source and target of a backup can't be the same directory (\'{}\')",
            source.display()
        );
    }

    ui::cli::log!();
    ui::cli::log!(
        "{} \'{}\' into \'{}\'",
        "Backing up".bold().cyan(),
        source.display(),
        target.display()
    );

    let repo = Repository::open(&target)?;
    let _lock = match args.dry_run {
        true => None,
        false => Some(TargetLock::acquire(&target)?),
    };

    let quotas = backup.quotas();
    let now = Local::now().naive_local();
    let now = now.with_nanosecond(0).unwrap_or(now);
    let classifier = make_classifier(loaded.config.first_day_of_week, &quotas, platform, now);
    let mut set = repo.load(&classifier)?;

    let kind = if args.on_demand {
        SnapshotKind::OnDemand
    } else {
        let earned = classifier.classify(&set, now, quotas.enabled_periods());
        if earned.is_empty() {
            ui::cli::log!("\'{}\' does not need a backup", source.display());
            return Ok(());
        }

        // A partial snapshot of the same period means a previous run was cut short.
        let interrupted: BTreeSet<String> = earned
            .iter()
            .filter_map(|period| classifier.find(&set, now, period, true))
            .map(|record| record.name())
            .collect();
        for name in interrupted {
            ui::cli::warning!(
                "Snapshot \'{}\' was interrupted. A new snapshot will take its place",
                name
            );
        }

        SnapshotKind::Scheduled(earned)
    };

    let is_at_boot = matches!(kind, SnapshotKind::Scheduled(flags) if flags.contains(Period::AtBoot));
    let name = naming::format(now, args.on_demand, is_at_boot);
    if backend.exists(&target.join(&name)) {
        bail!("Snapshot \'{}\' already exists", name);
    }

    let previous = set.latest().map(|record| record.path.clone());
    match &previous {
        Some(path) if backup.link => {
            ui::cli::log!("Linking unchanged files to \'{}\'", path.display());
        }
        Some(_) => {
            ui::cli::verbose_1!("Hard links are disabled, copying every file");
        }
        None => {
            ui::cli::log!("No previous snapshot found, copying every file");
        }
    }
    ui::cli::log!("New snapshot: {} ({})", name.bold().green(), kind);

    let archiver = Archiver::new(
        backend.clone(),
        source,
        previous,
        &target,
        &name,
        vec![target.clone(), loaded.dir.clone()],
        ArchiveOptions {
            use_hard_links: backup.link,
            compare_mode: backup.compare_mode(),
            concurrency: args.jobs.unwrap_or_else(num_cpus::get),
        },
    );
    let final_path = archiver.final_path().to_path_buf();
    let summary = archiver.snapshot()?;

    show_summary(&summary, args.dry_run);

    set.insert(SnapshotRecord::new(final_path, now, kind, false));

    if backup.clean {
        ui::cli::log!();
        ui::cli::log!("{}", "Cleaning old snapshots".bold().cyan());
        let clean_summary = retention::clean(&set, &quotas, backend.as_ref());
        super::cmd_clean::show_summary(&clean_summary, args.dry_run);
    }

    Ok(())
}

fn canonical_dir(path: &Path, what: &str) -> Result<PathBuf> {
    let canonical = std::fs::canonicalize(path).with_context(|| {
        format!("{} \'{}\' does not exist", what, path.display())
    })?;
    if !canonical.is_dir() {
        bail!("{} \'{}\' is not a directory", what, path.display());
    }
    Ok(canonical)
}

/// Builds the classifier for new snapshots. The boot time is only needed when
/// boot snapshots are enabled.
fn make_classifier(
    first_day_of_week: Weekday,
    quotas: &Quotas,
    platform: &dyn Platform,
    now: NaiveDateTime,
) -> Classifier {
    let classifier = Classifier::new(first_day_of_week);
    if quotas.at_boot == Quota::Disabled {
        return classifier;
    }

    match boot_time(platform, now) {
        Ok(boot_time) => {
            ui::cli::verbose_2!("System booted at {}", boot_time);
            classifier.with_boot_time(boot_time)
        }
        Err(e) => {
            ui::cli::warning!("Boot snapshots are disabled: {:#}", e);
            classifier
        }
    }
}

fn boot_time(platform: &dyn Platform, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let uptime = platform.system_uptime()?;
    let uptime = chrono::Duration::from_std(uptime).context("System uptime out of range")?;
    now.checked_sub_signed(uptime)
        .context("System uptime out of range")
}

fn show_summary(summary: &BackupSummary, dry_run: bool) {
    ui::cli::log!();
    if dry_run {
        ui::cli::log!("{}", "This snapshot would contain:".bold());
    } else {
        ui::cli::log!("{}", "Snapshot created".bold().green());
    }

    let mut table = Table::new_with_alignments(vec![
        Alignment::Left,
        Alignment::Right,
        Alignment::Right,
    ]);
    table.set_headers(vec![
        "".to_string(),
        "entries".bold().to_string(),
        "size".bold().to_string(),
    ]);
    table.add_row(vec![
        "Copied".bold().yellow().to_string(),
        summary.files_copied.to_string(),
        utils::format_size(summary.bytes_copied),
    ]);
    table.add_row(vec![
        "Linked".bold().cyan().to_string(),
        summary.files_linked.to_string(),
        utils::format_size(summary.bytes_linked),
    ]);
    table.add_row(vec![
        "Directories".bold().to_string(),
        summary.dirs_created.to_string(),
        String::new(),
    ]);
    table.print();

    if summary.excluded > 0 {
        ui::cli::log!(
            "{} excluded",
            utils::format_count(summary.excluded, "entry", "entries")
        );
    }
    if summary.unsupported > 0 {
        ui::cli::warning!(
            "{} skipped (not supported)",
            utils::format_count(summary.unsupported, "entry", "entries")
        );
    }
    if summary.failed > 0 {
        ui::cli::error!(
            "{} could not be backed up",
            utils::format_count(summary.failed, "entry", "entries")
        );
    }

    ui::cli::log!(
        "Finished in {}",
        utils::pretty_print_duration(summary.duration)
    );
}
