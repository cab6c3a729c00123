// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backup policy for files rewritten in place.
//!
//! The method comes from `VERSION_CONTROL` (overridable on the command
//! line) and the simple-backup suffix from `SIMPLE_BACKUP_SUFFIX`,
//! defaulting to `~`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackupMethod {
    /// Never make backups.
    None,
    /// Make simple backups: `file~`.
    Simple,
    /// Make numbered backups: `file.~N~`.
    Numbered,
    /// Numbered if numbered backups exist, simple otherwise.
    #[default]
    Existing,
}

impl BackupMethod {
    /// Parse a backup method name as `VERSION_CONTROL` spells them.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" | "off" => Some(BackupMethod::None),
            "simple" | "never" => Some(BackupMethod::Simple),
            "numbered" | "t" => Some(BackupMethod::Numbered),
            "existing" | "nil" => Some(BackupMethod::Existing),
            _ => None,
        }
    }

    /// The method selected by the environment, or the default.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("VERSION_CONTROL")
            .ok()
            .and_then(|value| BackupMethod::from_name(&value))
            .unwrap_or_default()
    }
}

/// The suffix for simple backups.
#[must_use]
pub fn backup_suffix() -> String {
    std::env::var("SIMPLE_BACKUP_SUFFIX")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "~".to_string())
}

/// The highest existing numbered-backup index of a file.
fn last_numbered(path: &Path) -> u32 {
    let Some(parent) = path.parent() else {
        return 0;
    };
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return 0;
    };
    let prefix = format!("{name}.~");
    let mut last = 0;
    if let Ok(entries) = fs::read_dir(if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    }) {
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(rest) = file_name.strip_prefix(&prefix)
                && let Some(number) = rest.strip_suffix('~')
                && let Ok(number) = number.parse::<u32>()
            {
                last = last.max(number);
            }
        }
    }
    last
}

/// Back up `path` before it is rewritten. Returns the backup path, `None`
/// when the method is `none` or the file does not exist yet.
pub fn make_backup(path: &Path, method: BackupMethod, suffix: &str) -> io::Result<Option<PathBuf>> {
    if method == BackupMethod::None || !path.exists() {
        return Ok(None);
    }
    let last = last_numbered(path);
    let numbered = match method {
        BackupMethod::Numbered => true,
        BackupMethod::Existing => last > 0,
        _ => false,
    };
    let backup = if numbered {
        let mut name = path.as_os_str().to_owned();
        name.push(format!(".~{}~", last + 1));
        PathBuf::from(name)
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    };
    fs::copy(path, &backup)?;
    Ok(Some(backup))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names() {
        assert_eq!(BackupMethod::from_name("none"), Some(BackupMethod::None));
        assert_eq!(BackupMethod::from_name("off"), Some(BackupMethod::None));
        assert_eq!(BackupMethod::from_name("simple"), Some(BackupMethod::Simple));
        assert_eq!(BackupMethod::from_name("never"), Some(BackupMethod::Simple));
        assert_eq!(BackupMethod::from_name("t"), Some(BackupMethod::Numbered));
        assert_eq!(BackupMethod::from_name("nil"), Some(BackupMethod::Existing));
        assert_eq!(BackupMethod::from_name("bogus"), None);
    }

    #[test]
    fn test_simple_backup() {
        let dir = std::env::temp_dir().join("pomerge-backup-simple");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("fr.po");
        fs::write(&file, "one").unwrap();
        let backup = make_backup(&file, BackupMethod::Simple, "~").unwrap().unwrap();
        assert_eq!(backup, dir.join("fr.po~"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "one");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_existing_prefers_numbered_when_present() {
        let dir = std::env::temp_dir().join("pomerge-backup-existing");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("fr.po");
        fs::write(&file, "one").unwrap();
        // No numbered backups yet: existing makes a simple backup.
        let backup = make_backup(&file, BackupMethod::Existing, "~")
            .unwrap()
            .unwrap();
        assert_eq!(backup, dir.join("fr.po~"));
        // Seed a numbered backup; existing now numbers.
        fs::write(dir.join("fr.po.~3~"), "old").unwrap();
        let backup = make_backup(&file, BackupMethod::Existing, "~")
            .unwrap()
            .unwrap();
        assert_eq!(backup, dir.join("fr.po.~4~"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_no_backup() {
        let missing = std::env::temp_dir().join("pomerge-backup-none/absent.po");
        assert!(
            make_backup(&missing, BackupMethod::Simple, "~")
                .unwrap()
                .is_none()
        );
    }
}
