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

//! Snapshot metadata is encoded in the snapshot directory name:
//!
//! ```text
//! 2024-03-07_14-30-00                   scheduled
//! 2024-03-07_14-30-00_ondemand          on-demand
//! 2024-03-07_14-30-00_boot              scheduled, first after boot
//! 2024-03-07_14-30-00_boot_partial      interrupted while being written
//! 2024-03-07_14-30-00_deleting          being removed by a cleanup
//! ```
//!
//! This module is the only place that knows about the format.

use chrono::{NaiveDateTime, Timelike};

use crate::global::defaults::{
    AT_BOOT_SUFFIX, DELETING_SUFFIX, ON_DEMAND_SUFFIX, PARTIAL_SUFFIX, SNAPSHOT_TIMESTAMP_FORMAT,
};

/// Metadata recovered from a snapshot directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotName {
    pub timestamp: NaiveDateTime,
    pub is_on_demand: bool,
    pub is_at_boot: bool,
    pub is_partial: bool,
}

/// Parses a directory name. Returns `None` if the name is not a snapshot name.
pub fn parse(name: &str) -> Option<SnapshotName> {
    let (name, is_partial) = strip(name, PARTIAL_SUFFIX);
    let (name, is_on_demand) = strip(name, ON_DEMAND_SUFFIX);
    let (name, is_at_boot) = strip(name, AT_BOOT_SUFFIX);

    let timestamp = NaiveDateTime::parse_from_str(name, SNAPSHOT_TIMESTAMP_FORMAT).ok()?;

    // The format has no room for fractional seconds, but be strict about
    // round-tripping so that two spellings never map to one snapshot.
    if timestamp.format(SNAPSHOT_TIMESTAMP_FORMAT).to_string() != name {
        return None;
    }

    Some(SnapshotName {
        timestamp,
        is_on_demand,
        is_at_boot,
        is_partial,
    })
}

/// Formats the final (promoted) name of a snapshot.
pub fn format(timestamp: NaiveDateTime, is_on_demand: bool, is_at_boot: bool) -> String {
    let mut name = timestamp
        .with_nanosecond(0)
        .unwrap_or(timestamp)
        .format(SNAPSHOT_TIMESTAMP_FORMAT)
        .to_string();
    if is_at_boot {
        name.push_str(AT_BOOT_SUFFIX);
    }
    if is_on_demand {
        name.push_str(ON_DEMAND_SUFFIX);
    }
    name
}

/// Name of the directory a snapshot is written to before promotion.
pub fn partial_name(final_name: &str) -> String {
    format!("{final_name}{PARTIAL_SUFFIX}")
}

/// Name a snapshot directory is renamed to right before its deletion.
pub fn deleting_name(name: &str) -> String {
    format!("{name}{DELETING_SUFFIX}")
}

/// True if the name belongs to a directory whose deletion was started.
pub fn is_deleting(name: &str) -> bool {
    name.ends_with(DELETING_SUFFIX)
}

fn strip<'a>(name: &'a str, suffix: &str) -> (&'a str, bool) {
    match name.strip_suffix(suffix) {
        Some(stripped) => (stripped, true),
        None => (name, false),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let parsed = parse("2024-03-07_14-30-00").unwrap();
        assert_eq!(parsed.timestamp, ts(2024, 3, 7, 14, 30, 0));
        assert!(!parsed.is_on_demand);
        assert!(!parsed.is_at_boot);
        assert!(!parsed.is_partial);
    }

    #[test]
    fn test_parse_suffixes() {
        let parsed = parse("2024-03-07_14-30-00_ondemand").unwrap();
        assert!(parsed.is_on_demand && !parsed.is_at_boot && !parsed.is_partial);

        let parsed = parse("2024-03-07_14-30-00_boot").unwrap();
        assert!(!parsed.is_on_demand && parsed.is_at_boot && !parsed.is_partial);

        let parsed = parse("2024-03-07_14-30-00_boot_partial").unwrap();
        assert!(!parsed.is_on_demand && parsed.is_at_boot && parsed.is_partial);

        let parsed = parse("2024-03-07_14-30-00_ondemand_partial").unwrap();
        assert!(parsed.is_on_demand && !parsed.is_at_boot && parsed.is_partial);
        assert_eq!(parsed.timestamp, ts(2024, 3, 7, 14, 30, 0));
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        assert!(parse("backup-config.json").is_none());
        assert!(parse(".linkback.lock").is_none());
        assert!(parse("2024-03-07").is_none());
        assert!(parse("2024-03-07_14-30-00_deleting").is_none());
        assert!(parse("2024-03-07_14-30-00_partial_boot").is_none());
        assert!(parse("2024-3-7_14-30-00").is_none());
        assert!(parse("2024-03-07_25-30-00").is_none());
    }

    #[test]
    fn test_format() {
        let t = ts(2024, 1, 2, 3, 4, 5);
        assert_eq!(format(t, false, false), "2024-01-02_03-04-05");
        assert_eq!(format(t, true, false), "2024-01-02_03-04-05_ondemand");
        assert_eq!(format(t, false, true), "2024-01-02_03-04-05_boot");
        assert_eq!(
            partial_name(&format(t, false, true)),
            "2024-01-02_03-04-05_boot_partial"
        );
        assert_eq!(
            deleting_name("2024-01-02_03-04-05"),
            "2024-01-02_03-04-05_deleting"
        );
        assert!(is_deleting("2024-01-02_03-04-05_deleting"));
    }

    #[test]
    fn test_format_then_parse() {
        let t = ts(2023, 12, 31, 23, 59, 59);
        let parsed = parse(&partial_name(&format(t, false, true))).unwrap();
        assert_eq!(parsed.timestamp, t);
        assert!(parsed.is_at_boot && parsed.is_partial && !parsed.is_on_demand);
    }
}
