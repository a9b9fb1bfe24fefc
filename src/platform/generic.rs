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

use std::{path::Path, time::Duration};

use anyhow::{Result, bail};

use super::{LinkError, Platform, link_error};

/// Fallback for targets without a dedicated implementation. Hard links go
/// through the standard library; uptime is not available, so at-boot
/// snapshots cannot be used.
pub struct GenericPlatform;

impl Platform for GenericPlatform {
    fn create_hard_link(&self, existing_path: &Path, new_path: &Path) -> Result<(), LinkError> {
        std::fs::hard_link(existing_path, new_path).map_err(|e| link_error(existing_path, e))
    }

    fn system_uptime(&self) -> Result<Duration> {
        bail!(
            "Reading the system uptime is not supported on {}",
            std::env::consts::OS
        )
    }
}
