use std::{fs, io, path::Path, time::SystemTime};

/// the parts of a file's metadata that tell whether it grew or was replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaSnap {
    pub len: u64,
    pub modified: Option<SystemTime>,
    pub identity: Option<(u64, u64)>,
}

impl MetaSnap {
    /// true when `other` is a different file than `self` at the same path
    pub fn is_replaced_by(&self, other: &MetaSnap) -> bool {
        match (self.identity, other.identity) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }
}

#[cfg(unix)]
fn identity(meta: &fs::Metadata) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    Some((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn identity(_meta: &fs::Metadata) -> Option<(u64, u64)> {
    None
}

pub fn stat_path(path: &Path) -> io::Result<MetaSnap> {
    let meta = fs::metadata(path)?;
    Ok(MetaSnap {
        len: meta.len(),
        modified: meta.modified().ok(),
        identity: identity(&meta),
    })
}

pub fn has_changed(prev: &Option<MetaSnap>, current: &MetaSnap) -> bool {
    prev.as_ref() != Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_stat_tracks_growth() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let before = stat_path(file.path()).unwrap();
        assert_eq!(before.len, 0);

        writeln!(file, "hello").unwrap();
        file.flush().unwrap();
        let after = stat_path(file.path()).unwrap();
        assert_eq!(after.len, 6);
        assert!(has_changed(&Some(before), &after));
        assert!(!has_changed(&Some(after), &after));
        assert!(has_changed(&None, &after));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = stat_path(&dir.path().join("nope.log")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_replaced_file_has_new_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old\n").unwrap();
        let old = stat_path(&path).unwrap();

        let staged = dir.path().join("app.log.new");
        fs::write(&staged, "new\n").unwrap();
        fs::rename(&staged, &path).unwrap();
        let new = stat_path(&path).unwrap();

        assert!(old.is_replaced_by(&new));
        assert!(!new.is_replaced_by(&new));
    }
}
