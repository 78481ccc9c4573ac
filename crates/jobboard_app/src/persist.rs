use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("state directory missing or not writable: {0}")]
    StateDir(String),
    #[error("failed to serialize state: {0}")]
    Serialize(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the state directory exists; create if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::StateDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
    }
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` through a temp file and a rename.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }

    /// Removes `{dir}/{filename}`; a missing file is not an error.
    pub fn remove(&self, filename: &str) -> Result<(), PersistError> {
        match fs::remove_file(self.dir.join(filename)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_missing_dirs_and_replaces_content() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("state");
        let writer = AtomicFileWriter::new(dir.clone());

        let path = writer.write("a.ron", "first").unwrap();
        assert_eq!(path, dir.join("a.ron"));
        writer.write("a.ron", "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");

        let leftovers = fs::read_dir(&dir).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn remove_tolerates_missing_file() {
        let root = tempfile::tempdir().unwrap();
        let writer = AtomicFileWriter::new(root.path().to_path_buf());
        writer.remove("absent.ron").unwrap();

        writer.write("present.ron", "x").unwrap();
        writer.remove("present.ron").unwrap();
        assert!(!root.path().join("present.ron").exists());
    }

    #[test]
    fn file_in_place_of_dir_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("blocker");
        fs::write(&blocker, "not a dir").unwrap();
        assert!(matches!(ensure_dir(&blocker), Err(PersistError::StateDir(_))));
    }
}
