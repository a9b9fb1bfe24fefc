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

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use super::{
    snapshot::{Period, PeriodFlags, SnapshotRecord},
    snapshot_set::SnapshotSet,
};

/// Week number of `date` within its year.
///
/// Week 1 is the week that contains January 1st and every week starts on
/// `first_day_of_week`, so the first and last weeks of a year may be short.
pub fn week_of_year(date: NaiveDate, first_day_of_week: Weekday) -> u32 {
    let jan_1 = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
    let offset = (jan_1.weekday().num_days_from_monday() + 7
        - first_day_of_week.num_days_from_monday())
        % 7;
    (date.ordinal0() + offset) / 7 + 1
}

/// Decides which periods a snapshot taken at a given time is the first of.
///
/// A snapshot is the first of a period instance (a given year, month, week,
/// day, hour, or boot session) when no earlier snapshot already carries that
/// period's flag for the same instance.
#[derive(Debug, Clone)]
pub struct Classifier {
    first_day_of_week: Weekday,
    /// Local time the system booted. Without it, at-boot lookups always fail
    /// and [`Period::AtBoot`] is never earned.
    boot_time: Option<NaiveDateTime>,
}

impl Classifier {
    pub fn new(first_day_of_week: Weekday) -> Self {
        Self {
            first_day_of_week,
            boot_time: None,
        }
    }

    /// Sets the boot time. This assumes the wall clock was not adjusted since boot.
    pub fn with_boot_time(mut self, boot_time: NaiveDateTime) -> Self {
        self.boot_time = Some(boot_time);
        self
    }

    /// True if `a` and `b` fall in the same instance of a calendar period.
    /// Always false for [`Period::AtBoot`], which is not a calendar period.
    pub fn same_period(&self, period: Period, a: NaiveDateTime, b: NaiveDateTime) -> bool {
        match period {
            Period::AtBoot => false,
            Period::Yearly => a.year() == b.year(),
            Period::Monthly => a.year() == b.year() && a.month() == b.month(),
            Period::Weekly => {
                a.year() == b.year()
                    && week_of_year(a.date(), self.first_day_of_week)
                        == week_of_year(b.date(), self.first_day_of_week)
            }
            Period::Daily => a.date() == b.date(),
            Period::Hourly => a.date() == b.date() && a.hour() == b.hour(),
        }
    }

    /// Finds the snapshot that represents the instance of `period` containing `at`.
    ///
    /// Complete snapshots are searched first. Partial snapshots are only
    /// considered when `allow_partial` is set and no complete one matches.
    pub fn find<'a>(
        &self,
        set: &'a SnapshotSet,
        at: NaiveDateTime,
        period: Period,
        allow_partial: bool,
    ) -> Option<&'a SnapshotRecord> {
        self.find_among(set, at, period, false).or_else(|| {
            if allow_partial {
                self.find_among(set, at, period, true)
            } else {
                None
            }
        })
    }

    fn find_among<'a>(
        &self,
        set: &'a SnapshotSet,
        at: NaiveDateTime,
        period: Period,
        include_partial: bool,
    ) -> Option<&'a SnapshotRecord> {
        let mut candidates = set
            .iter()
            .filter(|r| r.has(period) && (include_partial || !r.is_partial));

        match period {
            Period::AtBoot => {
                let boot_time = self.boot_time?;
                if at < boot_time {
                    // A past session: the latest at-boot snapshot up to `at` opened it.
                    candidates.filter(|r| r.timestamp <= at).last()
                } else {
                    candidates.find(|r| r.timestamp >= boot_time)
                }
            }
            _ => candidates.find(|r| self.same_period(period, r.timestamp, at)),
        }
    }

    /// Returns the subset of `periods` that a snapshot taken at `at` would be
    /// the first of, looking only at complete snapshots in `set`.
    pub fn classify(&self, set: &SnapshotSet, at: NaiveDateTime, periods: PeriodFlags) -> PeriodFlags {
        periods
            .iter()
            .filter(|period| *period != Period::AtBoot || self.boot_time.is_some())
            .filter(|period| self.find(set, at, *period, false).is_none())
            .collect()
    }
}
