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
    fs::{File, Metadata},
    io::{ErrorKind, Read},
    path::Path,
};

use anyhow::{Context, Result};
use filetime::FileTime;

use crate::global::defaults::COMPARE_BLOCK_SIZE;

/// How a source file is compared with its copy in the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    /// Size and modification time. A file rewritten with the same size and
    /// an identical modification time is reported as unchanged.
    Fast,
    /// Size, then the contents block by block.
    Thorough,
}

/// Returns true if `previous` exists and holds the same file as `current`.
///
/// `current_metadata` is the metadata of `current`, already read by the caller.
pub fn is_unchanged(
    current: &Path,
    current_metadata: &Metadata,
    previous: &Path,
    mode: CompareMode,
) -> Result<bool> {
    let previous_metadata = match std::fs::symlink_metadata(previous) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Could not read metadata of \'{}\'", previous.display()));
        }
    };

    if !previous_metadata.is_file() || previous_metadata.len() != current_metadata.len() {
        return Ok(false);
    }

    match mode {
        CompareMode::Fast => Ok(FileTime::from_last_modification_time(current_metadata)
            == FileTime::from_last_modification_time(&previous_metadata)),
        CompareMode::Thorough => same_contents(current, previous),
    }
}

/// Compares two files byte by byte, stopping at the first block that differs.
pub fn same_contents(a: &Path, b: &Path) -> Result<bool> {
    let mut file_a =
        File::open(a).with_context(|| format!("Could not open \'{}\'", a.display()))?;
    let mut file_b =
        File::open(b).with_context(|| format!("Could not open \'{}\'", b.display()))?;

    let mut buf_a = vec![0u8; COMPARE_BLOCK_SIZE];
    let mut buf_b = vec![0u8; COMPARE_BLOCK_SIZE];

    loop {
        let n_a = read_block(&mut file_a, &mut buf_a)
            .with_context(|| format!("Could not read \'{}\'", a.display()))?;
        let n_b = read_block(&mut file_b, &mut buf_b)
            .with_context(|| format!("Could not read \'{}\'", b.display()))?;

        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Fills `buf` unless the end of the file is reached first. Returns the number of bytes read.
fn read_block(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
