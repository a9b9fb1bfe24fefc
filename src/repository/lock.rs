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
    fs::{File, OpenOptions},
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};

use crate::{global::defaults::LOCK_FILE_NAME, ui};

/// Exclusive claim over a backup target.
///
/// Backups and cleanups of the same target must not overlap. The lock is a
/// file created atomically in the target directory and removed on drop.
#[derive(Debug)]
pub struct TargetLock {
    path: PathBuf,
}

impl TargetLock {
    pub fn acquire(target: &Path) -> Result<Self> {
        Self::acquire_with(target, |file| writeln!(file, "{}", std::process::id()))
    }

    /// Creates the lock file and fills it with `write_holder`. The file is
    /// removed again if writing fails.
    fn acquire_with(
        target: &Path,
        write_holder: impl FnOnce(&mut File) -> io::Result<()>,
    ) -> Result<Self> {
        let path = target.join(LOCK_FILE_NAME);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = std::fs::read_to_string(&path).unwrap_or_default();
                bail!(
                    "Target \'{}\' is locked by process {}. Remove \'{}\' if the lock is stale",
                    target.display(),
                    holder.trim(),
                    path.display()
                );
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Could not create lock file \'{}\'", path.display()));
            }
        };

        let written = write_holder(&mut file);
        drop(file);

        let lock = Self { path };
        written
            .with_context(|| format!("Could not write lock file \'{}\'", lock.path.display()))?;

        Ok(lock)
    }
}

impl Drop for TargetLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            ui::cli::warning!(
                "Could not remove lock file \'{}\': {}",
                self.path.display(),
                e
            );
        }
    }
}
