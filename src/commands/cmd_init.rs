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

use anyhow::{Context, Result, bail};
use chrono::Weekday;
use clap::Args;
use colored::Colorize;

use crate::{
    config::{self, BackupConfig, Config},
    global::defaults::{DEFAULT_CONFIG_FILE, DEFAULT_TARGET_DIRECTORY},
    ui::{self, prompt},
    utils,
};

use super::GlobalArgs;

#[derive(Args, Debug)]
#[clap(about = "Create a configuration file")]
pub struct CmdArgs {
    /// Accept every default without asking
    #[clap(short = 'y', long, default_value_t = false)]
    pub yes: bool,

    /// Directory to back up [default: current directory]
    #[clap(long, value_parser)]
    pub source: Option<PathBuf>,

    /// Directory to store the snapshots in [default: <source>/.backups]
    #[clap(long, value_parser)]
    pub target: Option<PathBuf>,
}

pub fn run(global_args: &GlobalArgs, args: &CmdArgs) -> Result<()> {
    let yes = args.yes;
    let cwd = std::env::current_dir().context("Could not read the current directory")?;

    let source = args.source.clone().unwrap_or_else(|| PathBuf::from("."));
    let source = ask_path(
        "Which directory would you like to back up?",
        &cwd.join(source),
        &cwd,
        yes,
    )?;

    let target = args
        .target
        .clone()
        .unwrap_or_else(|| source.join(DEFAULT_TARGET_DIRECTORY));
    let target = ask_path(
        "Where would you like to store your backups?",
        &cwd.join(target),
        &cwd,
        yes,
    )?;

    let count_prompt = |what: &str| {
        format!("How many {what} backups would you like to keep? (0 disables them, -1 keeps all)")
    };
    let boot = prompt::ask_value(&count_prompt("boot-time"), 0i64, yes)?;
    let yearly = prompt::ask_value(&count_prompt("yearly"), 0i64, yes)?;
    let monthly = prompt::ask_value(&count_prompt("monthly"), 5i64, yes)?;
    let weekly = prompt::ask_value(&count_prompt("weekly"), 0i64, yes)?;
    let daily = prompt::ask_value(&count_prompt("daily"), 5i64, yes)?;
    let hourly = prompt::ask_value(&count_prompt("hourly"), 0i64, yes)?;
    let ondemand = prompt::ask_value(&count_prompt("on-demand"), -1i64, yes)?;

    let link = prompt::confirm(
        "Would you like to hard-link unchanged files to the previous backup instead of copying them again?",
        true,
        yes,
    )?;
    let fast = link
        && prompt::confirm(
            "Would you like to detect changes by size and modification time only? (faster, may miss edits that keep both)",
            true,
            yes,
        )?;
    let clean = prompt::confirm(
        "Would you like to remove old backups automatically after each backup?",
        true,
        yes,
    )?;
    let first_day_of_week =
        prompt::ask_value("Which day does the week start on?", Weekday::Mon, yes)?;

    // An explicit file is taken as is. Otherwise the file goes into the target.
    let config_path = if global_args.config.is_dir() {
        target.join(DEFAULT_CONFIG_FILE)
    } else {
        utils::normalize_path(&cwd.join(&global_args.config))
    };

    if config_path.exists() {
        let overwrite = !yes
            && prompt::confirm(
                &format!("\'{}\' already exists. Overwrite it?", config_path.display()),
                false,
                false,
            )?;
        if !overwrite {
            bail!(
                "Configuration file \'{}\' already exists",
                config_path.display()
            );
        }
    }

    let config_dir = config::config_dir(&config_path);
    let config = Config {
        backups: vec![BackupConfig {
            source: utils::diff_paths(&source, &config_dir),
            target: utils::diff_paths(&target, &config_dir),
            boot: Some(boot),
            yearly: Some(yearly),
            monthly: Some(monthly),
            weekly: Some(weekly),
            daily: Some(daily),
            hourly: Some(hourly),
            ondemand: Some(ondemand),
            link,
            fast,
            clean,
        }],
        first_day_of_week,
    };

    std::fs::create_dir_all(&target)
        .with_context(|| format!("Could not create target \'{}\'", target.display()))?;
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Could not create directory \'{}\'", config_dir.display()))?;
    config.save(&config_path)?;

    ui::cli::log!(
        "{} \'{}\'",
        "Configuration file written to".bold().green(),
        config_path.display()
    );

    Ok(())
}

/// Asks for a directory. Relative answers are relative to `cwd`.
fn ask_path(prompt: &str, default: &Path, cwd: &Path, auto_confirm: bool) -> Result<PathBuf> {
    let default = utils::normalize_path(default);
    let answer = prompt::ask_value(prompt, default.display().to_string(), auto_confirm)?;
    Ok(utils::normalize_path(&cwd.join(answer)))
}
