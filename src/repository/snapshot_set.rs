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

use super::{
    classifier::Classifier,
    naming::SnapshotName,
    snapshot::{Period, PeriodFlags, SnapshotKind, SnapshotRecord},
};

/// The snapshots of a backup target, ordered by ascending timestamp.
///
/// Snapshots sharing a timestamp keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSet {
    records: Vec<SnapshotRecord>,
}

impl SnapshotSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the set from parsed directory names, deriving the period flags
    /// of every scheduled snapshot.
    ///
    /// Flags are not stored on disk: a snapshot is the first of a calendar
    /// period if no older complete snapshot already is. The at-boot flag is
    /// taken from the name, because the boot session of an old snapshot can't
    /// be recovered afterwards.
    pub fn from_parsed(mut entries: Vec<(PathBuf, SnapshotName)>, classifier: &Classifier) -> Self {
        entries.sort_by(|a, b| a.1.timestamp.cmp(&b.1.timestamp));

        let calendar: PeriodFlags = Period::CALENDAR.into_iter().collect();
        let mut set = SnapshotSet::new();

        for (path, name) in entries {
            let kind = if name.is_on_demand {
                SnapshotKind::OnDemand
            } else {
                let mut flags = classifier.classify(&set, name.timestamp, calendar);
                if name.is_at_boot {
                    flags.insert(Period::AtBoot);
                }
                SnapshotKind::Scheduled(flags)
            };

            set.records.push(SnapshotRecord::new(
                path,
                name.timestamp,
                kind,
                name.is_partial,
            ));
        }

        set
    }

    /// Inserts a record after every record with the same or an older timestamp.
    pub fn insert(&mut self, record: SnapshotRecord) {
        let index = self
            .records
            .partition_point(|r| r.timestamp <= record.timestamp);
        self.records.insert(index, record);
    }

    /// The most recent complete snapshot, or the most recent partial one if
    /// there is no complete snapshot.
    pub fn latest(&self) -> Option<&SnapshotRecord> {
        self.records
            .iter()
            .rev()
            .find(|r| !r.is_partial)
            .or_else(|| self.records.last())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SnapshotRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a SnapshotSet {
    type Item = &'a SnapshotRecord;
    type IntoIter = std::slice::Iter<'a, SnapshotRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
