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

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::{
    archiver::CompareMode,
    global::defaults::{DEFAULT_CONFIG_FILE, DEFAULT_TARGET_DIRECTORY},
    retention::{Quota, Quotas},
    utils,
};

/// One source directory and the target its snapshots are stored in.
///
/// Counts are the number of snapshots kept per period. A missing or negative
/// count keeps every snapshot, and zero disables the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Relative to the directory of the configuration file.
    pub source: PathBuf,
    /// Relative to the directory of the configuration file.
    pub target: PathBuf,

    #[serde(default)]
    pub boot: Option<i64>,
    #[serde(default)]
    pub yearly: Option<i64>,
    #[serde(default)]
    pub monthly: Option<i64>,
    #[serde(default)]
    pub weekly: Option<i64>,
    #[serde(default)]
    pub daily: Option<i64>,
    #[serde(default)]
    pub hourly: Option<i64>,
    #[serde(default)]
    pub ondemand: Option<i64>,

    /// Hard-link unchanged files to the previous snapshot.
    #[serde(default = "default_true")]
    pub link: bool,
    /// Detect changes by size and modification time only.
    #[serde(default)]
    pub fast: bool,
    /// Apply the retention policy after every backup.
    #[serde(default)]
    pub clean: bool,
}

impl BackupConfig {
    pub fn quotas(&self) -> Quotas {
        Quotas {
            at_boot: Quota::from_count(self.boot),
            yearly: Quota::from_count(self.yearly),
            monthly: Quota::from_count(self.monthly),
            weekly: Quota::from_count(self.weekly),
            daily: Quota::from_count(self.daily),
            hourly: Quota::from_count(self.hourly),
            on_demand: Quota::from_count(self.ondemand),
        }
    }

    pub fn compare_mode(&self) -> CompareMode {
        if self.fast {
            CompareMode::Fast
        } else {
            CompareMode::Thorough
        }
    }

    pub fn source_path(&self, config_dir: &Path) -> PathBuf {
        utils::normalize_path(&config_dir.join(&self.source))
    }

    pub fn target_path(&self, config_dir: &Path) -> PathBuf {
        utils::normalize_path(&config_dir.join(&self.target))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub backups: Vec<BackupConfig>,

    #[serde(default = "default_first_day_of_week")]
    pub first_day_of_week: Weekday,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            bail!(
                "Configuration file \'{}\' not found. Run `init` to create one",
                path.display()
            );
        }
        utils::json::load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        utils::json::save_json_pretty(self, path)
    }
}

fn default_true() -> bool {
    true
}

fn default_first_day_of_week() -> Weekday {
    Weekday::Mon
}

/// Resolves the path given on the command line to a configuration file.
/// A directory `D` stands for `D/.backups/backup-config.json`.
pub fn resolve_config_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(DEFAULT_TARGET_DIRECTORY).join(DEFAULT_CONFIG_FILE)
    } else {
        path.to_path_buf()
    }
}

/// Directory the paths of a configuration file are relative to.
pub fn config_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
