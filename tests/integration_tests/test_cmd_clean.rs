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
    use anyhow::Result;
    use linkback::commands::{cmd_backup, cmd_clean};

    use crate::{integration_tests::Fixture, test_utils};

    fn create_snapshot(fx: &Fixture, name: &str) -> Result<()> {
        test_utils::write_file(&fx.target.join(name).join("file0.txt"), b"zero")
    }

    #[test]
    fn test_clean_keeps_first_of_each_day() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|backup| backup.daily = Some(1))?;
        create_snapshot(&fx, "2024-01-01_00-00-00")?;
        create_snapshot(&fx, "2024-01-01_12-00-00")?;

        cmd_clean::run(&fx.global(), &cmd_clean::CmdArgs { dry_run: false })?;

        assert_eq!(fx.snapshots()?, vec!["2024-01-01_00-00-00"]);
        Ok(())
    }

    #[test]
    fn test_clean_respects_daily_quota() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|backup| backup.daily = Some(2))?;
        for name in [
            "2024-01-01_08-00-00",
            "2024-01-02_08-00-00",
            "2024-01-03_08-00-00",
            "2024-01-04_08-00-00",
        ] {
            create_snapshot(&fx, name)?;
        }

        cmd_clean::run(&fx.global(), &cmd_clean::CmdArgs { dry_run: false })?;

        assert_eq!(
            fx.snapshots()?,
            vec!["2024-01-03_08-00-00", "2024-01-04_08-00-00"]
        );
        Ok(())
    }

    #[test]
    fn test_dry_run_clean_removes_nothing() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|backup| backup.daily = Some(1))?;
        create_snapshot(&fx, "2024-01-01_00-00-00")?;
        create_snapshot(&fx, "2024-01-01_12-00-00")?;
        let before = test_utils::dir_names(&fx.target)?;

        cmd_clean::run(&fx.global(), &cmd_clean::CmdArgs { dry_run: true })?;

        assert_eq!(test_utils::dir_names(&fx.target)?, before);
        Ok(())
    }

    #[test]
    fn test_clean_sweeps_interrupted_deletions() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|_| {})?;
        create_snapshot(&fx, "2024-01-01_00-00-00")?;
        create_snapshot(&fx, "2023-12-31_00-00-00_deleting")?;

        cmd_clean::run(&fx.global(), &cmd_clean::CmdArgs { dry_run: false })?;

        assert_eq!(fx.snapshots()?, vec!["2024-01-01_00-00-00"]);
        Ok(())
    }

    #[test]
    fn test_clean_fails_on_locked_target() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|backup| backup.daily = Some(1))?;
        create_snapshot(&fx, "2024-01-01_00-00-00")?;
        create_snapshot(&fx, "2024-01-01_12-00-00")?;
        std::fs::write(fx.target.join(".linkback.lock"), b"12345")?;

        assert!(cmd_clean::run(&fx.global(), &cmd_clean::CmdArgs { dry_run: false }).is_err());
        assert_eq!(fx.snapshots()?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_backup_cleans_automatically() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|backup| {
            backup.daily = Some(1);
            backup.clean = true;
        })?;
        create_snapshot(&fx, "2020-01-01_00-00-00")?;
        create_snapshot(&fx, "2020-01-02_00-00-00")?;

        cmd_backup::run(
            &fx.global(),
            &cmd_backup::CmdArgs {
                dry_run: false,
                on_demand: false,
                jobs: Some(2),
            },
        )?;

        let snapshots = fx.snapshots()?;
        assert_eq!(snapshots.len(), 1);
        assert!(!snapshots[0].starts_with("2020"));
        Ok(())
    }
}
