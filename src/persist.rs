//! Atomic file replacement
//!
//! Generated artifacts are never written in place: content goes to a temp
//! file in the same directory and is renamed over the target, so an
//! interrupted run leaves either the old file or the new one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Result, ScaffoldError};

/// Mode given to a file that did not exist before. Generated artifacts are
/// bind-mounted into containers whose users differ from the host user.
pub const SHARED_MODE: u32 = 0o644;

/// Mode given to private key material copied into the build context
pub const OWNER_ONLY_MODE: u32 = 0o600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistMode {
    /// Readable by everyone (0o644 on Unix)
    #[default]
    Shared,
    /// Owner read/write only (0o600 on Unix)
    OwnerOnly,
    /// Keep the mode of the file being replaced
    Preserve(u32),
}

impl PersistMode {
    /// Preserve the existing target's mode, otherwise fall back to `self`
    fn resolve(self, path: &Path) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(meta) = fs::metadata(path) {
                return Self::Preserve(meta.permissions().mode() & 0o7777);
            }
        }
        #[cfg(not(unix))]
        let _ = path;
        self
    }

    pub fn mode(self) -> u32 {
        match self {
            Self::Shared => SHARED_MODE,
            Self::OwnerOnly => OWNER_ONLY_MODE,
            Self::Preserve(mode) => mode,
        }
    }
}

pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    write_atomic_with_mode(path, contents, PersistMode::Shared)
}

/// Write `contents` to `path` atomically. `mode` applies to new files only;
/// a replaced file keeps its mode.
pub fn write_atomic_with_mode(path: &Path, contents: &[u8], mode: PersistMode) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mode = mode.resolve(path);
    let mut tmp = NamedTempFile::new_in(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode.mode()))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;

    tmp.persist(path)
        .map_err(|e| ScaffoldError::IoError(e.error))?;
    Ok(())
}

/// Write several files as a unit. When one write fails, the files written
/// before it get their previous content back (or are removed if they were
/// new) and the failing write's error is returned.
pub fn write_all_atomic<'a, I>(writes: I) -> Result<()>
where
    I: IntoIterator<Item = (PathBuf, &'a [u8])>,
{
    let mut done: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::new();

    for (path, contents) in writes {
        let previous = match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                rollback(&done);
                return Err(e.into());
            }
        };
        if let Err(e) = write_atomic(&path, contents) {
            rollback(&done);
            return Err(e);
        }
        done.push((path, previous));
    }
    Ok(())
}

fn rollback(done: &[(PathBuf, Option<Vec<u8>>)]) {
    for (path, previous) in done.iter().rev() {
        let restored = match previous {
            Some(bytes) => write_atomic(path, bytes),
            None => fs::remove_file(path).map_err(ScaffoldError::from),
        };
        match restored {
            Ok(()) => tracing::warn!(path = %path.display(), "restored after failed write"),
            Err(e) => tracing::error!(path = %path.display(), error = %e, "could not restore file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("config").join("odoo.conf");
        write_atomic(&target, b"[options]\n").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "[options]\n");
    }

    #[test]
    fn test_write_replaces_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("Dockerfile");
        write_atomic(&target, b"old").unwrap();
        write_atomic(&target, b"new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_world_readable() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("odoo_pg_pass");
        write_atomic(&target, b"secret").unwrap();
        assert_eq!(mode_of(&target), 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_replaced_file_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("run.sh");
        fs::write(&target, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o755)).unwrap();

        write_atomic(&target, b"#!/bin/sh\necho hi\n").unwrap();
        assert_eq!(mode_of(&target), 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_mode() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join(".ssh").join("deploy_key");
        write_atomic_with_mode(&target, b"key", PersistMode::OwnerOnly).unwrap();
        assert_eq!(mode_of(&target), 0o600);
    }

    #[test]
    fn test_failed_write_restores_earlier_files() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("gitman.yml");
        let created = dir.path().join("new.txt");
        fs::write(&existing, "before").unwrap();
        // A regular file where a directory is expected makes the last write fail
        fs::write(dir.path().join("config"), "not a directory").unwrap();

        let result = write_all_atomic(vec![
            (existing.clone(), &b"after"[..]),
            (created.clone(), &b"fresh"[..]),
            (dir.path().join("config").join("odoo.conf"), &b"[options]\n"[..]),
        ]);

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&existing).unwrap(), "before");
        assert!(!created.exists());
    }
}
