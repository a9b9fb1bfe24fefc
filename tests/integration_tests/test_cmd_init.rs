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

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use anyhow::Result;
    use chrono::Weekday;
    use linkback::{
        commands::{GlobalArgs, cmd_backup, cmd_init},
        config::Config,
        retention::Quota,
    };

    use crate::{integration_tests::Fixture, test_utils};

    fn init_args(source: &Path, target: Option<PathBuf>) -> cmd_init::CmdArgs {
        cmd_init::CmdArgs {
            yes: true,
            source: Some(source.to_path_buf()),
            target,
        }
    }

    fn global_args(config: &Path) -> GlobalArgs {
        GlobalArgs {
            config: config.to_path_buf(),
            quiet: true,
            verbosity: None,
        }
    }

    #[test]
    fn test_init_with_defaults() -> Result<()> {
        let fx = Fixture::new()?;

        cmd_init::run(&fx.global(), &init_args(&fx.source, None))?;

        let config_path = fx.target.join("backup-config.json");
        let config = Config::load(&config_path)?;
        assert_eq!(config.first_day_of_week, Weekday::Mon);
        assert_eq!(config.backups.len(), 1);

        let backup = &config.backups[0];
        assert_eq!(backup.source, Path::new(".."));
        assert_eq!(backup.target, Path::new("."));
        assert!(backup.link);
        assert!(backup.fast);
        assert!(backup.clean);

        let quotas = backup.quotas();
        assert_eq!(quotas.at_boot, Quota::Disabled);
        assert_eq!(quotas.yearly, Quota::Disabled);
        assert_eq!(quotas.monthly, Quota::Limited(5));
        assert_eq!(quotas.weekly, Quota::Disabled);
        assert_eq!(quotas.daily, Quota::Limited(5));
        assert_eq!(quotas.hourly, Quota::Disabled);
        assert_eq!(quotas.on_demand, Quota::Unlimited);

        // Never overwritten without asking.
        assert!(cmd_init::run(&fx.global(), &init_args(&fx.source, None)).is_err());

        cmd_backup::run(
            &fx.global(),
            &cmd_backup::CmdArgs {
                dry_run: false,
                on_demand: false,
                jobs: None,
            },
        )?;
        assert_eq!(fx.snapshots()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_init_with_external_target() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let source = tmp.path().join("source");
        let store = tmp.path().join("store");
        test_utils::create_source_tree(&source)?;

        cmd_init::run(
            &global_args(&source),
            &init_args(&source, Some(store.clone())),
        )?;

        let config_path = store.join("backup-config.json");
        let config = Config::load(&config_path)?;
        assert_eq!(config.backups[0].source, Path::new("../source"));
        assert_eq!(config.backups[0].target, Path::new("."));

        cmd_backup::run(
            &global_args(&config_path),
            &cmd_backup::CmdArgs {
                dry_run: false,
                on_demand: true,
                jobs: Some(1),
            },
        )?;

        let snapshots = test_utils::snapshot_names(&store)?;
        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0].ends_with("_ondemand"));
        assert_eq!(
            test_utils::dir_names(&store.join(&snapshots[0]))?,
            vec!["docs", "empty", "file0.txt", "photos"]
        );
        Ok(())
    }
}
