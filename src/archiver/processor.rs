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

use std::{fs::Metadata, path::Path};

use anyhow::Result;

use crate::backend::StorageBackend;

use super::compare::{self, CompareMode};

/// What was done with a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileAction {
    /// Hard-linked to the previous snapshot. Carries the file size.
    Linked(u64),
    /// Copied. Carries the number of bytes written.
    Copied(u64),
}

/// Links `source` into the new snapshot if the copy in `previous` is unchanged,
/// and copies it otherwise.
///
/// `previous` is `None` when there is no previous snapshot or hard links are
/// disabled.
pub(crate) fn process_file(
    backend: &dyn StorageBackend,
    source: &Path,
    metadata: &Metadata,
    previous: Option<&Path>,
    destination: &Path,
    compare_mode: CompareMode,
) -> Result<FileAction> {
    if let Some(previous) = previous {
        if compare::is_unchanged(source, metadata, previous, compare_mode)? {
            backend.hard_link(previous, destination)?;
            return Ok(FileAction::Linked(metadata.len()));
        }
    }

    let bytes = backend.copy_file(source, destination)?;
    Ok(FileAction::Copied(bytes))
}

#[cfg(test)]
mod tests {
    use filetime::FileTime;
    use tempfile::tempdir;

    use crate::{backend::localfs::LocalFS, platform};

    use super::*;

    #[test]
    fn test_link_or_copy() -> Result<()> {
        let tmp = tempdir()?;
        let backend = LocalFS::new(platform::native());
        let mtime = FileTime::from_unix_time(1_700_000_000, 0);

        let source = tmp.path().join("source.txt");
        let previous = tmp.path().join("previous.txt");
        std::fs::write(&source, b"contents")?;
        std::fs::write(&previous, b"contents")?;
        filetime::set_file_mtime(&source, mtime)?;
        filetime::set_file_mtime(&previous, mtime)?;
        let metadata = std::fs::metadata(&source)?;

        let linked = tmp.path().join("linked.txt");
        let action = process_file(
            &backend,
            &source,
            &metadata,
            Some(&previous),
            &linked,
            CompareMode::Fast,
        )?;
        assert_eq!(action, FileAction::Linked(8));

        let copied = tmp.path().join("copied.txt");
        let action = process_file(&backend, &source, &metadata, None, &copied, CompareMode::Fast)?;
        assert_eq!(action, FileAction::Copied(8));

        std::fs::write(&previous, b"CONTENTS")?;
        filetime::set_file_mtime(&previous, mtime)?;
        let recopied = tmp.path().join("recopied.txt");
        let action = process_file(
            &backend,
            &source,
            &metadata,
            Some(&previous),
            &recopied,
            CompareMode::Thorough,
        )?;
        assert_eq!(action, FileAction::Copied(8));
        assert_eq!(std::fs::read(&recopied)?, b"contents");
        Ok(())
    }
}
