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

#[cfg(any(target_os = "linux", target_os = "android"))]
const UPTIME_CLOCK: libc::clockid_t = libc::CLOCK_BOOTTIME;

// Does not advance while the system sleeps, so this underestimates uptime
// on machines that were suspended.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const UPTIME_CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC;

pub struct UnixPlatform;

impl Platform for UnixPlatform {
    fn create_hard_link(&self, existing_path: &Path, new_path: &Path) -> Result<(), LinkError> {
        std::fs::hard_link(existing_path, new_path).map_err(|e| link_error(existing_path, e))
    }

    fn system_uptime(&self) -> Result<Duration> {
        // SAFETY: timespec is plain old data, all zeroes is a valid value.
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };

        // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
        let ret = unsafe { libc::clock_gettime(UPTIME_CLOCK, &mut ts) };
        if ret != 0 {
            bail!(
                "Could not read system uptime: {}",
                std::io::Error::last_os_error()
            );
        }

        Ok(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
    }
}
