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

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::{
    repository::{Repository, classifier::Classifier},
    retention,
    ui::{
        self,
        table::{Alignment, Table},
    },
    utils,
};

use super::GlobalArgs;

#[derive(Args, Debug)]
#[clap(about = "List the snapshots of every configured target")]
pub struct CmdArgs {}

pub fn run(global_args: &GlobalArgs, _args: &CmdArgs) -> Result<()> {
    let loaded = super::load_config(global_args)?;
    let classifier = Classifier::new(loaded.config.first_day_of_week);

    for backup in &loaded.config.backups {
        let target = backup.target_path(&loaded.dir);
        let repo = Repository::open(&target)?;
        let set = repo.load(&classifier)?;
        let plan = retention::plan(&set, &backup.quotas());

        ui::cli::log!();
        ui::cli::log!(
            "{} \'{}\': {}",
            "Snapshots in".bold(),
            target.display(),
            utils::format_count(set.len() as u64, "snapshot", "snapshots")
        );

        if set.is_empty() {
            continue;
        }

        let mut table = Table::new_with_alignments(vec![
            Alignment::Left,
            Alignment::Left,
            Alignment::Left,
        ]);
        table.set_headers(vec![
            "Snapshot".bold().to_string(),
            "Periods".bold().to_string(),
            "Status".bold().to_string(),
        ]);

        for record in &set {
            let mut status = Vec::new();
            if record.is_partial {
                status.push("PARTIAL".bold().red().to_string());
            }
            if plan.removes(&record.path) {
                status.push("SHOULD CLEAN".bold().yellow().to_string());
            }

            table.add_row(vec![
                record.name(),
                record.kind.to_string(),
                status.join(" "),
            ]);
        }
        table.print();
    }

    Ok(())
}
