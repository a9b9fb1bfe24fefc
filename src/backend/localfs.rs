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

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use filetime::FileTime;

use crate::platform::Platform;

use super::StorageBackend;

/// Backend operating on a locally mounted filesystem.
pub struct LocalFS {
    platform: Arc<dyn Platform>,
}

impl LocalFS {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }
}

impl StorageBackend for LocalFS {
    fn create_dir(&self, path: &Path) -> Result<()> {
        std::fs::create_dir(path)
            .with_context(|| format!("Could not create directory \'{}\'", path.display()))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Could not create directory \'{}\'", path.display()))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64> {
        let bytes = std::fs::copy(from, to).with_context(|| {
            format!(
                "Could not copy \'{}\' to \'{}\'",
                from.display(),
                to.display()
            )
        })?;

        // Fast comparisons in later snapshots rely on the copy keeping the
        // source modification time.
        let metadata = std::fs::metadata(from)
            .with_context(|| format!("Could not read metadata of \'{}\'", from.display()))?;
        filetime::set_file_mtime(to, FileTime::from_last_modification_time(&metadata))
            .with_context(|| format!("Could not set modification time of \'{}\'", to.display()))?;

        Ok(bytes)
    }

    fn hard_link(&self, existing_path: &Path, new_path: &Path) -> Result<()> {
        self.platform
            .create_hard_link(existing_path, new_path)
            .map_err(anyhow::Error::from)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::rename(from, to).with_context(|| {
            format!(
                "Could not rename \'{}\' to \'{}\'",
                from.display(),
                to.display()
            )
        })
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("Could not remove directory \'{}\'", path.display()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }
}
