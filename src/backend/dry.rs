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

use super::StorageBackend;

/// A dummy storage backend that sets itself before another backend, redirecting
/// queries but ignoring every mutation.
pub struct DryBackend {
    backend: Arc<dyn StorageBackend>,
}

impl DryBackend {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }
}

impl StorageBackend for DryBackend {
    #[inline]
    fn create_dir(&self, path: &Path) -> Result<()> {
        let _ = path;
        Ok(())
    }

    #[inline]
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let _ = path;
        Ok(())
    }

    /// Reports the size of the source, as the real copy would.
    #[inline]
    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64> {
        let _ = to;
        let metadata = std::fs::metadata(from)
            .with_context(|| format!("Could not read metadata of \'{}\'", from.display()))?;
        Ok(metadata.len())
    }

    #[inline]
    fn hard_link(&self, existing_path: &Path, new_path: &Path) -> Result<()> {
        let _ = new_path;
        let _ = existing_path;
        Ok(())
    }

    #[inline]
    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let _ = to;
        let _ = from;
        Ok(())
    }

    #[inline]
    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let _ = path;
        Ok(())
    }

    #[inline]
    fn exists(&self, path: &Path) -> bool {
        self.backend.exists(path)
    }
}
