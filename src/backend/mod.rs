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

pub mod dry;
pub mod localfs;

use std::{path::Path, sync::Arc};

use anyhow::Result;

use dry::DryBackend;

/// Abstraction of the filesystem that holds the snapshots.
///
/// Every mutation of the backup target goes through this trait, which is
/// what makes dry runs possible: the [`DryBackend`] accepts the same calls
/// and performs none of them. Reads of the source tree do not go through
/// the backend.
pub trait StorageBackend: Send + Sync {
    /// Creates a new, empty directory at the provided path.
    fn create_dir(&self, path: &Path) -> Result<()>;

    /// Recursively create a directory and all of its parent components if they are missing.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copies the contents of a file, keeping its modification time.
    /// Returns the number of bytes copied.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64>;

    /// Creates `new_path` as a hard link to `existing_path`.
    fn hard_link(&self, existing_path: &Path, new_path: &Path) -> Result<()>;

    /// Renames a file or directory.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Removes a directory after removing its contents.
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// Returns true if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Encapsulates a StorageBackend inside a DryBackend.
#[inline]
pub fn make_dry_backend(backend: Arc<dyn StorageBackend>, dry: bool) -> Arc<dyn StorageBackend> {
    match dry {
        true => Arc::new(DryBackend::new(backend)),
        false => backend,
    }
}
