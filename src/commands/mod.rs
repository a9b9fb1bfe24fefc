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

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};

use crate::config::{self, Config};

pub mod cmd_backup;
pub mod cmd_clean;
pub mod cmd_init;
pub mod cmd_list;

// CLI arguments
#[derive(Parser, Debug)]
#[clap(
    version = env!("CARGO_PKG_VERSION"), // Version from crate metadata
    about = "linkback incremental backup tool",
)]
pub struct Cli {
    // Subcommand
    #[command(subcommand)]
    pub command: Command,

    // Global arguments
    #[clap(flatten)]
    pub global_args: GlobalArgs,
}

// List of commands
#[derive(Subcommand, Debug)]
pub enum Command {
    Init(cmd_init::CmdArgs),
    Backup(cmd_backup::CmdArgs),
    Clean(cmd_clean::CmdArgs),
    List(cmd_list::CmdArgs),
}

#[derive(Parser, Debug)]
#[clap(group = ArgGroup::new("verbosity_group").multiple(true))]
pub struct GlobalArgs {
    /// Configuration file, or a directory containing .backups/backup-config.json
    #[clap(short = 'c', long, value_parser, default_value = ".")]
    pub config: PathBuf,

    /// Disable logging (verbosity = 0)
    #[clap(long, value_parser, group = "verbosity_group")]
    pub quiet: bool,

    /// Set the verbosity level [0-3]
    #[clap(short = 'v', long, value_parser, group = "verbosity_group")]
    pub verbosity: Option<u32>,
}

/// A configuration file and the directory its paths are relative to.
pub(crate) struct LoadedConfig {
    pub path: PathBuf,
    pub dir: PathBuf,
    pub config: Config,
}

pub(crate) fn load_config(global_args: &GlobalArgs) -> Result<LoadedConfig> {
    let path = config::resolve_config_path(&global_args.config);
    let config = Config::load(&path)?;

    let dir = config::config_dir(&path);
    let dir = std::fs::canonicalize(&dir)
        .with_context(|| format!("Could not resolve \'{}\'", dir.display()))?;

    Ok(LoadedConfig { path, dir, config })
}

pub fn run(args: &Cli) -> Result<()> {
    match &args.command {
        Command::Init(cmd_args) => cmd_init::run(&args.global_args, cmd_args),
        Command::Backup(cmd_args) => cmd_backup::run(&args.global_args, cmd_args),
        Command::Clean(cmd_args) => cmd_clean::run(&args.global_args, cmd_args),
        Command::List(cmd_args) => cmd_list::run(&args.global_args, cmd_args),
    }
}
