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

pub mod classifier;
pub mod lock;
pub mod naming;
pub mod snapshot;
pub mod snapshot_set;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::ui;
use classifier::Classifier;
use snapshot_set::SnapshotSet;

/// A backup target: the directory holding the snapshot history of one source.
pub struct Repository {
    target: PathBuf,
}

impl Repository {
    /// Opens an existing target. Fails if the target directory does not exist.
    pub fn open(target: &Path) -> Result<Self> {
        if !target.is_dir() {
            bail!(
                "Backup target \'{}\' does not exist or is not a directory",
                target.display()
            );
        }

        Ok(Self {
            target: target.to_path_buf(),
        })
    }

    /// Lists the snapshot directories of the target and classifies them.
    /// Entries whose names can't be parsed are ignored.
    pub fn load(&self, classifier: &Classifier) -> Result<SnapshotSet> {
        let mut entries = Vec::new();
        for (name, path) in self.list_dirs()? {
            match naming::parse(&name) {
                Some(parsed) => entries.push((path, parsed)),
                None => {
                    ui::cli::verbose_2!("Ignoring \'{}\'", path.display());
                }
            }
        }

        let set = SnapshotSet::from_parsed(entries, classifier);
        ui::cli::verbose_2!(
            "Loaded {} snapshots from \'{}\'",
            set.len(),
            self.target.display()
        );
        Ok(set)
    }

    /// Directories left behind by a deletion that did not finish.
    pub fn deletion_leftovers(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .list_dirs()?
            .into_iter()
            .filter(|(name, _)| naming::is_deleting(name))
            .map(|(_, path)| path)
            .collect())
    }

    /// Returns (name, path) of every directory in the target, sorted by name.
    fn list_dirs(&self) -> Result<Vec<(String, PathBuf)>> {
        let read_dir = std::fs::read_dir(&self.target).with_context(|| {
            format!("Could not list target \'{}\'", self.target.display())
        })?;

        let mut dirs = Vec::new();
        for entry in read_dir {
            let entry = entry.with_context(|| {
                format!("Could not list target \'{}\'", self.target.display())
            })?;

            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }

            // Non UTF-8 names are never snapshot names.
            if let Ok(name) = entry.file_name().into_string() {
                dirs.push((name, entry.path()));
            }
        }

        dirs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(dirs)
    }
}

#[cfg(test)]
mod test {
    use chrono::Weekday;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_open_missing_target() {
        let tmp = tempdir().unwrap();
        assert!(Repository::open(&tmp.path().join("nope")).is_err());
    }

    #[test]
    fn test_load_ignores_foreign_entries() -> Result<()> {
        let tmp = tempdir()?;
        let target = tmp.path();
        std::fs::create_dir(target.join("2024-01-01_00-00-00"))?;
        std::fs::create_dir(target.join("2024-01-02_00-00-00_partial"))?;
        std::fs::create_dir(target.join("2024-01-03_00-00-00_ondemand"))?;
        std::fs::create_dir(target.join("2023-12-01_00-00-00_deleting"))?;
        std::fs::create_dir(target.join("photos"))?;
        std::fs::write(target.join("2024-01-04_00-00-00"), b"not a dir")?;
        std::fs::write(target.join("backup-config.json"), b"{}")?;

        let repo = Repository::open(target)?;
        let set = repo.load(&Classifier::new(Weekday::Mon))?;

        let names: Vec<String> = set.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "2024-01-01_00-00-00",
                "2024-01-02_00-00-00_partial",
                "2024-01-03_00-00-00_ondemand"
            ]
        );

        let leftovers = repo.deletion_leftovers()?;
        assert_eq!(leftovers, vec![target.join("2023-12-01_00-00-00_deleting")]);
        Ok(())
    }
}
