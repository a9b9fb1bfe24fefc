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

use crate::utils::size;

// -- Snapshot naming --
// A snapshot directory is named after the local time it was taken, followed by
// optional markers. Markers are stripped in reverse order of appearance:
// partial, then on-demand, then at-boot.

/// `chrono` format of the timestamp part of a snapshot directory name.
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
pub const ON_DEMAND_SUFFIX: &str = "_ondemand";
pub const AT_BOOT_SUFFIX: &str = "_boot";
/// Appended while a snapshot is being written. Removed on promotion.
pub const PARTIAL_SUFFIX: &str = "_partial";
/// Appended to a snapshot before it is recursively deleted.
pub const DELETING_SUFFIX: &str = "_deleting";

// -- Layout --
pub const DEFAULT_TARGET_DIRECTORY: &str = ".backups";
pub const DEFAULT_CONFIG_FILE: &str = "backup-config.json";
pub const LOCK_FILE_NAME: &str = ".linkback.lock";

// -- Comparison --
/// Block size used when comparing two files byte by byte.
pub const COMPARE_BLOCK_SIZE: usize = 64 * size::KiB as usize;

// -- Display --
pub const DEFAULT_VERBOSITY: u32 = 1;
