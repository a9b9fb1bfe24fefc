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
    use chrono::Weekday;
    use linkback::{
        commands::{cmd_backup, cmd_clean, cmd_list},
        repository::{Repository, classifier::Classifier},
    };

    use crate::{integration_tests::Fixture, test_utils};

    fn backup_args(dry_run: bool, on_demand: bool) -> cmd_backup::CmdArgs {
        cmd_backup::CmdArgs {
            dry_run,
            on_demand,
            jobs: Some(2),
        }
    }

    #[cfg(unix)]
    fn inode(path: &std::path::Path) -> Result<u64> {
        use std::os::unix::fs::MetadataExt;
        Ok(std::fs::metadata(path)?.ino())
    }

    #[test]
    fn test_backup_skips_its_own_target() -> Result<()> {
        let fx = Fixture::new()?;
        // Yearly only, so that a second run never falls in a new period.
        fx.write_config(|backup| {
            backup.yearly = Some(5);
            backup.daily = Some(0);
        })?;

        cmd_backup::run(&fx.global(), &backup_args(false, false))?;

        let snapshots = fx.snapshots()?;
        assert_eq!(snapshots.len(), 1);
        assert!(!snapshots[0].ends_with("_partial"));

        let snapshot = fx.target.join(&snapshots[0]);
        assert_eq!(
            test_utils::dir_names(&snapshot)?,
            vec!["docs", "empty", "file0.txt", "photos"]
        );
        assert_eq!(std::fs::read(snapshot.join("docs/nested/file2.txt"))?, b"two");
        assert!(snapshot.join("empty").is_dir());

        // The lock is released.
        assert_eq!(
            test_utils::dir_names(&fx.target)?,
            vec![snapshots[0].clone(), "backup-config.json".to_string()]
        );

        // Same year: no new snapshot is needed.
        cmd_backup::run(&fx.global(), &backup_args(false, false))?;
        assert_eq!(fx.snapshots()?, snapshots);

        cmd_list::run(&fx.global(), &cmd_list::CmdArgs {})?;
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_unchanged_files_share_storage() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|_| {})?;

        cmd_backup::run(&fx.global(), &backup_args(false, false))?;
        test_utils::write_file(&fx.source.join("docs/file1.txt"), b"one, edited")?;
        cmd_backup::run(&fx.global(), &backup_args(false, true))?;

        let snapshots = fx.snapshots()?;
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[1].ends_with("_ondemand"));
        let first = fx.target.join(&snapshots[0]);
        let second = fx.target.join(&snapshots[1]);

        for unchanged in ["file0.txt", "docs/nested/file2.txt", "photos/file3.bin"] {
            assert_eq!(inode(&first.join(unchanged))?, inode(&second.join(unchanged))?);
        }

        let changed = "docs/file1.txt";
        assert_ne!(inode(&first.join(changed))?, inode(&second.join(changed))?);
        assert_eq!(std::fs::read(first.join(changed))?, b"one");
        assert_eq!(std::fs::read(second.join(changed))?, b"one, edited");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_source_skips_its_own_target() -> Result<()> {
        let fx = Fixture::new()?;
        let link = fx.source.with_file_name("link");
        std::os::unix::fs::symlink(&fx.source, &link)?;
        // Relative to <source>/.backups, the source is reached through the link.
        fx.write_config(|backup| backup.source = "../../link".into())?;
        test_utils::write_file(&fx.target.join("2020-01-01_00-00-00/file0.txt"), b"zero")?;

        cmd_backup::run(&fx.global(), &backup_args(false, false))?;

        let snapshots = fx.snapshots()?;
        assert_eq!(snapshots.len(), 2);
        let snapshot = fx.target.join(&snapshots[1]);
        assert_eq!(
            test_utils::dir_names(&snapshot)?,
            vec!["docs", "empty", "file0.txt", "photos"]
        );
        Ok(())
    }

    #[test]
    fn test_fast_compare_trusts_size_and_mtime() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|backup| backup.fast = true)?;

        cmd_backup::run(&fx.global(), &backup_args(false, false))?;

        // Same size and same modification time, different contents.
        test_utils::write_file(&fx.source.join("file0.txt"), b"ZERO")?;
        cmd_backup::run(&fx.global(), &backup_args(false, true))?;

        let snapshots = fx.snapshots()?;
        let second = fx.target.join(&snapshots[1]);
        assert_eq!(std::fs::read(second.join("file0.txt"))?, b"zero");
        Ok(())
    }

    #[test]
    fn test_thorough_compare_detects_same_size_edits() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|backup| backup.fast = false)?;

        cmd_backup::run(&fx.global(), &backup_args(false, false))?;
        test_utils::write_file(&fx.source.join("file0.txt"), b"ZERO")?;
        cmd_backup::run(&fx.global(), &backup_args(false, true))?;

        let snapshots = fx.snapshots()?;
        let second = fx.target.join(&snapshots[1]);
        assert_eq!(std::fs::read(second.join("file0.txt"))?, b"ZERO");
        assert_eq!(std::fs::read(second.join("docs/file1.txt"))?, b"one");
        Ok(())
    }

    #[test]
    fn test_dry_run_writes_nothing() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|_| {})?;

        cmd_backup::run(&fx.global(), &backup_args(true, false))?;
        assert_eq!(test_utils::dir_names(&fx.target)?, vec!["backup-config.json"]);

        cmd_backup::run(&fx.global(), &backup_args(false, false))?;
        let before = test_utils::dir_names(&fx.target)?;
        let snapshot = fx.target.join(&fx.snapshots()?[0]);
        let snapshot_before = test_utils::dir_names(&snapshot)?;

        test_utils::write_file(&fx.source.join("new_file.txt"), b"new")?;
        cmd_backup::run(&fx.global(), &backup_args(true, true))?;

        assert_eq!(test_utils::dir_names(&fx.target)?, before);
        assert_eq!(test_utils::dir_names(&snapshot)?, snapshot_before);
        Ok(())
    }

    #[test]
    fn test_partial_snapshot_is_not_a_complete_one() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|backup| {
            backup.yearly = Some(1);
            backup.daily = Some(0);
        })?;

        let partial = fx.target.join("2020-01-01_00-00-00_partial");
        test_utils::write_file(&partial.join("file0.txt"), b"zero")?;

        cmd_backup::run(&fx.global(), &backup_args(false, false))?;

        let snapshots = fx.snapshots()?;
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0], "2020-01-01_00-00-00_partial");

        let repo = Repository::open(&fx.target)?;
        let set = repo.load(&Classifier::new(Weekday::Mon))?;
        let latest = set.latest().unwrap();
        assert!(!latest.is_partial);
        assert_eq!(latest.name(), snapshots[1]);

        // The complete snapshot takes the only yearly slot.
        cmd_clean::run(&fx.global(), &cmd_clean::CmdArgs { dry_run: false })?;
        assert_eq!(fx.snapshots()?, vec![snapshots[1].clone()]);
        Ok(())
    }

    #[test]
    fn test_missing_target_fails() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|backup| backup.target = "../missing".into())?;

        assert!(cmd_backup::run(&fx.global(), &backup_args(false, false)).is_err());
        assert!(!fx.source.join("missing").exists());
        Ok(())
    }

    #[test]
    fn test_locked_target_fails() -> Result<()> {
        let fx = Fixture::new()?;
        fx.write_config(|_| {})?;
        std::fs::write(fx.target.join(".linkback.lock"), b"12345")?;

        assert!(cmd_backup::run(&fx.global(), &backup_args(false, false)).is_err());
        assert!(fx.snapshots()?.is_empty());

        // Dry runs don't take the lock.
        cmd_backup::run(&fx.global(), &backup_args(true, false))?;
        Ok(())
    }
}
