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

use std::path::PathBuf;

use anyhow::Result;
use chrono::Weekday;
use tempfile::TempDir;

use linkback::{
    commands::GlobalArgs,
    config::{BackupConfig, Config},
    global::defaults::{DEFAULT_CONFIG_FILE, DEFAULT_TARGET_DIRECTORY},
};

use crate::test_utils;

mod test_cmd_backup;
mod test_cmd_clean;
mod test_cmd_init;

/// A source tree that stores its own backups in `<source>/.backups`, next
/// to the configuration file.
pub(crate) struct Fixture {
    _tmp: TempDir,
    pub source: PathBuf,
    pub target: PathBuf,
}

impl Fixture {
    pub(crate) fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let source = tmp.path().join("source");
        test_utils::create_source_tree(&source)?;

        let target = source.join(DEFAULT_TARGET_DIRECTORY);
        std::fs::create_dir_all(&target)?;

        Ok(Self {
            _tmp: tmp,
            source,
            target,
        })
    }

    /// Writes a configuration with a single backup. By default only the daily
    /// period is enabled and hard links with fast comparison are used.
    pub(crate) fn write_config(&self, edit: impl FnOnce(&mut BackupConfig)) -> Result<()> {
        let mut backup = BackupConfig {
            source: PathBuf::from(".."),
            target: PathBuf::from("."),
            boot: Some(0),
            yearly: Some(0),
            monthly: Some(0),
            weekly: Some(0),
            daily: Some(5),
            hourly: Some(0),
            ondemand: None,
            link: true,
            fast: true,
            clean: false,
        };
        edit(&mut backup);

        let config = Config {
            backups: vec![backup],
            first_day_of_week: Weekday::Mon,
        };
        config.save(&self.target.join(DEFAULT_CONFIG_FILE))
    }

    pub(crate) fn global(&self) -> GlobalArgs {
        GlobalArgs {
            config: self.source.clone(),
            quiet: true,
            verbosity: None,
        }
    }

    pub(crate) fn snapshots(&self) -> Result<Vec<String>> {
        test_utils::snapshot_names(&self.target)
    }
}
