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

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod windows;

#[cfg(not(any(unix, windows)))]
pub mod generic;

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Result;
use thiserror::Error;

/// Failure to create a hard link.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("\'{path}\' not found")]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("access denied linking \'{path}\'")]
    AccessDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not link \'{path}\': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The two OS-specific primitives the backup engine needs.
///
/// One implementation per target OS, picked once at process start with [`native`].
pub trait Platform: Send + Sync {
    /// Creates `new_path` as a hard link to `existing_path`.
    fn create_hard_link(&self, existing_path: &Path, new_path: &Path) -> Result<(), LinkError>;

    /// Time elapsed since the system booted.
    fn system_uptime(&self) -> Result<Duration>;
}

/// Returns the platform implementation for the OS this binary was built for.
pub fn native() -> Arc<dyn Platform> {
    #[cfg(unix)]
    {
        Arc::new(unix::UnixPlatform)
    }

    #[cfg(windows)]
    {
        Arc::new(windows::WindowsPlatform)
    }

    #[cfg(not(any(unix, windows)))]
    {
        Arc::new(generic::GenericPlatform)
    }
}

/// Classifies a failed `link` call into the [`LinkError`] taxonomy.
pub(crate) fn link_error(path: &Path, err: io::Error) -> LinkError {
    let path = path.to_path_buf();
    match err.kind() {
        io::ErrorKind::NotFound => LinkError::NotFound { path, source: err },
        io::ErrorKind::PermissionDenied => LinkError::AccessDenied { path, source: err },
        _ => LinkError::Io { path, source: err },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_error_taxonomy() {
        let path = Path::new("/some/file");

        let err = link_error(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, LinkError::NotFound { .. }));

        let err = link_error(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, LinkError::AccessDenied { .. }));

        let err = link_error(path, io::Error::from(io::ErrorKind::AlreadyExists));
        assert!(matches!(err, LinkError::Io { .. }));
        assert!(err.to_string().contains("/some/file"));
    }
}
