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

pub mod compare;
mod processor;

use std::{
    fs::FileType,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, anyhow, bail};
use colored::Colorize;
use crossbeam_channel::Sender;

pub use compare::CompareMode;
use processor::FileAction;

use crate::{
    backend::StorageBackend, global, repository::naming, ui, ui::backup_progress::BackupProgress,
    utils,
};

pub struct ArchiveOptions {
    pub use_hard_links: bool,
    pub compare_mode: CompareMode,
    /// Number of threads processing files.
    pub concurrency: usize,
}

/// Counters of a finished (or interrupted) snapshot.
#[derive(Debug, Clone, Default)]
pub struct BackupSummary {
    pub dirs_created: u64,
    pub files_copied: u64,
    pub files_linked: u64,
    pub bytes_copied: u64,
    pub bytes_linked: u64,
    pub excluded: u64,
    pub unsupported: u64,
    pub failed: u64,
    pub duration: Duration,
}

impl BackupSummary {
    fn record(&mut self, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::DirCreated => self.dirs_created += 1,
            EntryOutcome::File(FileAction::Copied(bytes)) => {
                self.files_copied += 1;
                self.bytes_copied += bytes;
            }
            EntryOutcome::File(FileAction::Linked(bytes)) => {
                self.files_linked += 1;
                self.bytes_linked += bytes;
            }
            EntryOutcome::Excluded => self.excluded += 1,
            EntryOutcome::Unsupported(_) => self.unsupported += 1,
            EntryOutcome::Failed(_) => self.failed += 1,
        }
    }
}

enum EntryOutcome {
    DirCreated,
    File(FileAction),
    Excluded,
    Unsupported(&'static str),
    Failed(anyhow::Error),
}

/// Outcome of one source entry, sent from the walker and the workers to the reporter.
struct EntryReport {
    /// Path relative to the source root.
    path: PathBuf,
    outcome: EntryOutcome,
}

/// Writes a new snapshot of a source tree into a backup target.
///
/// The snapshot is written to `<name>_partial` and only renamed to `<name>`
/// once every entry was processed. Entries that fail are reported and
/// skipped, they don't abort the snapshot.
pub struct Archiver {
    backend: Arc<dyn StorageBackend>,
    source_root: PathBuf,
    previous_snapshot: Option<PathBuf>,
    partial_path: PathBuf,
    final_path: PathBuf,
    exclude_paths: Vec<PathBuf>,
    options: ArchiveOptions,
}

impl Archiver {
    /// `exclude_paths` are absolute. Those inside `source_root` are not backed
    /// up, and neither is the snapshot being written.
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        source_root: PathBuf,
        previous_snapshot: Option<PathBuf>,
        target: &Path,
        snapshot_name: &str,
        exclude_paths: Vec<PathBuf>,
        options: ArchiveOptions,
    ) -> Self {
        let partial_path = target.join(naming::partial_name(snapshot_name));
        let final_path = target.join(snapshot_name);

        let mut exclude_paths: Vec<PathBuf> = exclude_paths
            .iter()
            .chain(std::iter::once(&partial_path))
            .filter_map(|path| utils::relative_to(path, &source_root))
            .filter(|path| !path.as_os_str().is_empty())
            .collect();
        exclude_paths.sort();
        exclude_paths.dedup();

        Self {
            backend,
            source_root,
            previous_snapshot,
            partial_path,
            final_path,
            exclude_paths,
            options,
        }
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Walks the source tree and writes the snapshot.
    ///
    /// Directories are created by the walking thread before their children
    /// are listed, and files are handed to a thread pool. The snapshot is
    /// promoted after the pool has drained. If the process is interrupted,
    /// the walk stops and the snapshot stays partial.
    pub fn snapshot(self) -> Result<BackupSummary> {
        let start = Instant::now();

        if !self.source_root.is_dir() {
            bail!(
                "Source \'{}\' does not exist or is not a directory",
                self.source_root.display()
            );
        }

        let root_children = children_rev_sorted(&self.source_root)?;
        self.backend.create_dir_all(&self.partial_path)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.concurrency.max(1))
            .thread_name(|i| format!("linkback-worker-{i}"))
            .build()
            .context("Could not create the worker pool")?;

        let (report_tx, report_rx) = crossbeam_channel::unbounded::<EntryReport>();

        // Reporter thread. Logs every outcome and aggregates the summary.
        let reporter_thread = std::thread::spawn(move || {
            let progress = BackupProgress::new();
            let mut summary = BackupSummary::default();

            while let Ok(report) = report_rx.recv() {
                summary.record(&report.outcome);
                progress.suspend(|| log_report(&report));
                progress.processed(summary.bytes_copied);
            }

            progress.finish();
            summary
        });

        let mut stack: Vec<PathBuf> = root_children;
        let mut interrupted = false;

        // The walk runs on this thread, the pool only processes files.
        pool.in_place_scope(|scope| {
            while let Some(relative_path) = stack.pop() {
                if global::is_interrupted() {
                    interrupted = true;
                    break;
                }

                if self.exclude_paths.contains(&relative_path) {
                    send(&report_tx, relative_path, EntryOutcome::Excluded);
                    continue;
                }

                let source = self.source_root.join(&relative_path);
                let destination = self.partial_path.join(&relative_path);

                let metadata = match std::fs::symlink_metadata(&source) {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        let e = anyhow!(e)
                            .context(format!("Could not read metadata of \'{}\'", source.display()));
                        send(&report_tx, relative_path, EntryOutcome::Failed(e));
                        continue;
                    }
                };

                if metadata.is_dir() {
                    if let Err(e) = self.backend.create_dir(&destination) {
                        send(&report_tx, relative_path, EntryOutcome::Failed(e));
                        continue;
                    }

                    match children_rev_sorted(&source) {
                        Ok(children) => {
                            stack.extend(children.into_iter().map(|c| relative_path.join(c)));
                            send(&report_tx, relative_path, EntryOutcome::DirCreated);
                        }
                        Err(e) => send(&report_tx, relative_path, EntryOutcome::Failed(e)),
                    }
                } else if metadata.is_file() {
                    let previous = self
                        .previous_snapshot
                        .as_ref()
                        .filter(|_| self.options.use_hard_links)
                        .map(|p| p.join(&relative_path));

                    let backend = &self.backend;
                    let compare_mode = self.options.compare_mode;
                    let tx = report_tx.clone();
                    scope.spawn(move |_| {
                        let outcome = match processor::process_file(
                            backend.as_ref(),
                            &source,
                            &metadata,
                            previous.as_deref(),
                            &destination,
                            compare_mode,
                        ) {
                            Ok(action) => EntryOutcome::File(action),
                            Err(e) => EntryOutcome::Failed(e),
                        };
                        send(&tx, relative_path, outcome);
                    });
                } else {
                    send(
                        &report_tx,
                        relative_path,
                        EntryOutcome::Unsupported(file_type_name(&metadata.file_type())),
                    );
                }
            }
        });

        // Every worker has finished here. Dropping the last sender ends the reporter.
        drop(report_tx);
        let mut summary = reporter_thread
            .join()
            .map_err(|_| anyhow!("The reporter thread panicked"))?;
        summary.duration = start.elapsed();

        if interrupted {
            bail!(
                "Backup interrupted. The snapshot was left at \'{}\'",
                self.partial_path.display()
            );
        }

        self.backend.rename(&self.partial_path, &self.final_path)?;
        ui::cli::verbose_2!(
            "Promoted \'{}\' to \'{}\'",
            self.partial_path.display(),
            self.final_path.display()
        );

        Ok(summary)
    }
}

fn send(tx: &Sender<EntryReport>, path: PathBuf, outcome: EntryOutcome) {
    // The reporter only goes away after the walk, so a failed send can't happen.
    let _ = tx.send(EntryReport { path, outcome });
}

/// File names of the children of `dir`, sorted in reverse so that popping
/// them from a stack yields them in ascending order.
fn children_rev_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut children = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Could not list directory \'{}\'", dir.display()))?
    {
        let entry =
            entry.with_context(|| format!("Could not list directory \'{}\'", dir.display()))?;
        children.push(PathBuf::from(entry.file_name()));
    }
    children.sort_by(|a, b| b.cmp(a));
    Ok(children)
}

fn file_type_name(file_type: &FileType) -> &'static str {
    if file_type.is_symlink() {
        return "symlink";
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if file_type.is_block_device() {
            return "block device";
        } else if file_type.is_char_device() {
            return "character device";
        } else if file_type.is_fifo() {
            return "fifo";
        } else if file_type.is_socket() {
            return "socket";
        }
    }

    "special file"
}

fn log_report(report: &EntryReport) {
    let path = report.path.display();
    match &report.outcome {
        EntryOutcome::DirCreated => {
            ui::cli::verbose_1!("{:>9} {}", "created".bold().green(), path);
        }
        EntryOutcome::File(FileAction::Linked(_)) => {
            ui::cli::verbose_1!("{:>9} {}", "linked".bold().cyan(), path);
        }
        EntryOutcome::File(FileAction::Copied(bytes)) => {
            ui::cli::verbose_1!(
                "{:>9} {} ({})",
                "copied".bold().yellow(),
                path,
                utils::format_size(*bytes)
            );
        }
        EntryOutcome::Excluded => {
            ui::cli::verbose_1!("{:>9} {}", "excluded".bold().dimmed(), path);
        }
        EntryOutcome::Unsupported(kind) => {
            ui::cli::warning!("Skipping \'{}\': {} entries are not supported", path, kind);
        }
        EntryOutcome::Failed(e) => {
            ui::cli::error!("Could not back up \'{}\': {:#}", path, e);
        }
    }
}
