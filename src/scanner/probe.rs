use std::fs;
use std::path::Path;

/// What a single stat call learned about a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    pub exists: bool,
    pub is_dir: bool,
    /// File length in bytes (0 for directories and missing entries)
    pub size: u64,
}

impl EntryInfo {
    pub const MISSING: EntryInfo = EntryInfo {
        exists: false,
        is_dir: false,
        size: 0,
    };
}

/// Stat a path, following symlinks. Never fails: permission errors, dangling
/// links and entries that vanish mid-scan all come back as `MISSING`.
pub fn probe(path: &Path) -> EntryInfo {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => EntryInfo {
            exists: true,
            is_dir: true,
            size: 0,
        },
        Ok(meta) => EntryInfo {
            exists: true,
            is_dir: false,
            size: meta.len(),
        },
        Err(err) => {
            tracing::debug!("probe failed for {}: {}", path.display(), err);
            EntryInfo::MISSING
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_reports_its_length() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, vec![0u8; 1234]).unwrap();

        let info = probe(&path);
        assert!(info.exists);
        assert!(!info.is_dir);
        assert_eq!(info.size, 1234);
    }

    #[test]
    fn directory_is_classified() {
        let dir = TempDir::new().unwrap();
        let info = probe(dir.path());
        assert!(info.exists);
        assert!(info.is_dir);
        assert_eq!(info.size, 0);
    }

    #[test]
    fn missing_path_is_swallowed() {
        let dir = TempDir::new().unwrap();
        assert_eq!(probe(&dir.path().join("nope")), EntryInfo::MISSING);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_missing() {
        let dir = TempDir::new().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink(dir.path().join("gone"), &link).unwrap();
        assert_eq!(probe(&link), EntryInfo::MISSING);
    }
}
