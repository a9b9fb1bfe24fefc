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

use std::{collections::HashMap, path::Path};

use anyhow::Result;

use crate::{
    backend::StorageBackend,
    global,
    repository::{
        Repository, naming,
        snapshot::{Period, PeriodFlags, SnapshotRecord},
        snapshot_set::SnapshotSet,
    },
    ui,
};

/// How many snapshots of one kind are retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    /// The kind is not tracked. No snapshot is kept or created for it.
    Disabled,
    Limited(usize),
    Unlimited,
}

impl Quota {
    /// Maps a configured count: absent or negative is unlimited, zero disables.
    pub fn from_count(count: Option<i64>) -> Self {
        match count {
            None => Quota::Unlimited,
            Some(n) if n < 0 => Quota::Unlimited,
            Some(0) => Quota::Disabled,
            Some(n) => Quota::Limited(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        matches!(self, Quota::Disabled)
    }
}

impl std::fmt::Display for Quota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quota::Disabled => write!(f, "disabled"),
            Quota::Limited(n) => write!(f, "{n}"),
            Quota::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Retention quotas of a backup target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quotas {
    pub at_boot: Quota,
    pub yearly: Quota,
    pub monthly: Quota,
    pub weekly: Quota,
    pub daily: Quota,
    pub hourly: Quota,
    pub on_demand: Quota,
}

impl Quotas {
    pub fn for_period(&self, period: Period) -> Quota {
        match period {
            Period::AtBoot => self.at_boot,
            Period::Yearly => self.yearly,
            Period::Monthly => self.monthly,
            Period::Weekly => self.weekly,
            Period::Daily => self.daily,
            Period::Hourly => self.hourly,
        }
    }

    /// Periods whose quota is not disabled, i.e. the periods new snapshots can earn.
    pub fn enabled_periods(&self) -> PeriodFlags {
        Period::ALL
            .into_iter()
            .filter(|p| !self.for_period(*p).is_disabled())
            .collect()
    }

    fn for_class(&self, class: VoteClass) -> Quota {
        match class {
            VoteClass::Period(period) => self.for_period(period),
            VoteClass::OnDemand => self.on_demand,
        }
    }
}

/// A reason a snapshot may be kept for: one of its periods, or being on-demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum VoteClass {
    Period(Period),
    OnDemand,
}

#[derive(Debug, Clone, Copy)]
struct Remaining {
    /// Complete snapshots that can still be kept.
    complete: usize,
    /// Snapshots that can still be kept, counting partial ones too.
    with_partial: usize,
}

/// Which snapshots of a set survive a cleanup. Both lists are sorted by ascending timestamp.
#[derive(Debug, Default)]
pub struct RetentionPlan<'a> {
    pub to_keep: Vec<&'a SnapshotRecord>,
    pub to_remove: Vec<&'a SnapshotRecord>,
}

impl RetentionPlan<'_> {
    pub fn removes(&self, path: &Path) -> bool {
        self.to_remove.iter().any(|r| r.path == path)
    }
}

/// Decides which snapshots to keep.
///
/// Snapshots are visited from newest to oldest. Every period flag (or the
/// on-demand status) of a snapshot votes to keep it while its quota lasts,
/// and a snapshot is kept if any vote says so. A partial snapshot may take a
/// spare slot of its period but never uses up the quota of complete ones.
pub fn plan<'a>(set: &'a SnapshotSet, quotas: &Quotas) -> RetentionPlan<'a> {
    let mut remaining: HashMap<VoteClass, Remaining> = HashMap::new();
    let mut plan = RetentionPlan::default();

    for record in set.iter().rev() {
        let classes: Vec<VoteClass> = if record.is_on_demand() {
            vec![VoteClass::OnDemand]
        } else {
            record.flags().iter().map(VoteClass::Period).collect()
        };

        let mut keep = false;
        for class in classes {
            match quotas.for_class(class) {
                Quota::Unlimited => keep = true,
                Quota::Disabled => {}
                Quota::Limited(n) => {
                    let left = remaining.entry(class).or_insert(Remaining {
                        complete: n,
                        with_partial: n,
                    });

                    if !record.is_partial && left.complete > 0 {
                        left.complete -= 1;
                        left.with_partial = left.with_partial.saturating_sub(1);
                        keep = true;
                    } else if record.is_partial && left.with_partial > 0 {
                        left.with_partial -= 1;
                        keep = true;
                    }
                }
            }
        }

        if keep {
            plan.to_keep.push(record);
        } else {
            plan.to_remove.push(record);
        }
    }

    plan.to_keep.reverse();
    plan.to_remove.reverse();
    plan
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanSummary {
    pub kept: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Removes the snapshots that the retention plan does not keep.
///
/// Each snapshot is first renamed with the deletion marker and then removed,
/// so an interrupted deletion never leaves behind something that looks like
/// a complete snapshot. Failures are reported and the cleanup continues.
/// An interrupt stops the cleanup before the next snapshot.
pub fn clean(set: &SnapshotSet, quotas: &Quotas, backend: &dyn StorageBackend) -> CleanSummary {
    let plan = plan(set, quotas);
    let mut summary = CleanSummary {
        kept: plan.to_keep.len(),
        ..Default::default()
    };

    for record in &plan.to_remove {
        if global::is_interrupted() {
            ui::cli::warning!("Cleanup interrupted");
            break;
        }

        ui::cli::log!("Removing snapshot \'{}\' ({})", record.name(), record.kind);

        match remove_snapshot(record, backend) {
            Ok(()) => summary.removed += 1,
            Err(e) => {
                ui::cli::error!("Could not remove \'{}\': {:#}", record.path.display(), e);
                summary.failed += 1;
            }
        }
    }

    summary
}

fn remove_snapshot(record: &SnapshotRecord, backend: &dyn StorageBackend) -> Result<()> {
    let deleting = record
        .path
        .with_file_name(naming::deleting_name(&record.name()));
    backend.rename(&record.path, &deleting)?;
    backend.remove_dir_all(&deleting)
}

/// Finishes deletions that were interrupted in a previous cleanup.
/// Returns the number of leftovers removed.
pub fn sweep_leftovers(repo: &Repository, backend: &dyn StorageBackend) -> Result<usize> {
    let mut removed = 0;
    for leftover in repo.deletion_leftovers()? {
        ui::cli::log!("Removing leftover \'{}\'", leftover.display());
        match backend.remove_dir_all(&leftover) {
            Ok(()) => removed += 1,
            Err(e) => {
                ui::cli::error!("{:#}", e);
            }
        }
    }
    Ok(removed)
}
