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

use chrono::NaiveDateTime;

/// A calendar period (or the boot session) a scheduled snapshot can be the
/// first representative of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    AtBoot,
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::AtBoot,
        Period::Yearly,
        Period::Monthly,
        Period::Weekly,
        Period::Daily,
        Period::Hourly,
    ];

    /// The periods derived from the calendar, i.e. all except [`Period::AtBoot`].
    pub const CALENDAR: [Period; 5] = [
        Period::Yearly,
        Period::Monthly,
        Period::Weekly,
        Period::Daily,
        Period::Hourly,
    ];

    #[inline]
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            Period::AtBoot => "boot",
            Period::Yearly => "yearly",
            Period::Monthly => "monthly",
            Period::Weekly => "weekly",
            Period::Daily => "daily",
            Period::Hourly => "hourly",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A set of [`Period`]s stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PeriodFlags(u8);

impl PeriodFlags {
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub fn insert(&mut self, period: Period) {
        self.0 |= period.bit();
    }

    #[inline]
    pub fn contains(&self, period: Period) -> bool {
        self.0 & period.bit() != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Period> + '_ {
        Period::ALL.into_iter().filter(|p| self.contains(*p))
    }
}

impl FromIterator<Period> for PeriodFlags {
    fn from_iter<I: IntoIterator<Item = Period>>(iter: I) -> Self {
        let mut flags = PeriodFlags::empty();
        for period in iter {
            flags.insert(period);
        }
        flags
    }
}

impl std::fmt::Display for PeriodFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = self.iter().map(Period::name).collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Either an unscheduled copy or a scheduled one with the periods it represents.
///
/// On-demand snapshots live outside the period system: they never carry
/// period flags and never satisfy a period lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    OnDemand,
    Scheduled(PeriodFlags),
}

impl std::fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotKind::OnDemand => write!(f, "on-demand"),
            SnapshotKind::Scheduled(flags) => write!(f, "{}", flags),
        }
    }
}

/// A snapshot directory in the backup target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    /// Current location of the snapshot root, including the partial marker if present.
    pub path: PathBuf,
    /// Local wall-clock time the snapshot was taken.
    pub timestamp: NaiveDateTime,
    pub kind: SnapshotKind,
    pub is_partial: bool,
}

impl SnapshotRecord {
    pub fn new(path: PathBuf, timestamp: NaiveDateTime, kind: SnapshotKind, is_partial: bool) -> Self {
        Self {
            path,
            timestamp,
            kind,
            is_partial,
        }
    }

    #[inline]
    pub fn is_on_demand(&self) -> bool {
        matches!(self.kind, SnapshotKind::OnDemand)
    }

    /// Period flags of a scheduled snapshot. Empty for on-demand snapshots.
    #[inline]
    pub fn flags(&self) -> PeriodFlags {
        match self.kind {
            SnapshotKind::OnDemand => PeriodFlags::empty(),
            SnapshotKind::Scheduled(flags) => flags,
        }
    }

    #[inline]
    pub fn has(&self, period: Period) -> bool {
        self.flags().contains(period)
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_flags() {
        let mut flags = PeriodFlags::empty();
        assert!(flags.is_empty());

        flags.insert(Period::Daily);
        flags.insert(Period::Monthly);
        assert!(flags.contains(Period::Daily));
        assert!(flags.contains(Period::Monthly));
        assert!(!flags.contains(Period::Yearly));
        assert_eq!(flags.to_string(), "monthly, daily");
        assert_eq!(
            flags.iter().collect::<Vec<_>>(),
            vec![Period::Monthly, Period::Daily]
        );
    }

    #[test]
    fn test_on_demand_has_no_flags() {
        let record = SnapshotRecord::new(
            PathBuf::from("/t/2024-03-07_14-30-00_ondemand"),
            chrono::NaiveDate::from_ymd_opt(2024, 3, 7)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
            SnapshotKind::OnDemand,
            false,
        );
        assert!(record.is_on_demand());
        assert!(record.flags().is_empty());
        assert!(!record.has(Period::Daily));
        assert_eq!(record.name(), "2024-03-07_14-30-00_ondemand");
    }
}
