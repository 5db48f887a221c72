//! Per-run working directories.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

/// A uniquely named directory owned by one run. Every artifact of the run
/// is written beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirectory {
    id: String,
    path: PathBuf,
}

impl RunDirectory {
    /// Create `run_<timestamp>` under `base`. A numeric suffix is added if
    /// another run already claimed the same millisecond.
    pub fn create(base: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(base)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f").to_string();

        let mut id = stamp.clone();
        let mut suffix = 1;
        loop {
            let path = base.join(format!("run_{}", id));
            match std::fs::create_dir(&path) {
                Ok(()) => return Ok(Self { id, path }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    id = format!("{}_{}", stamp, suffix);
                    suffix += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Create (if needed) and return a subdirectory.
    pub fn subdir(&self, name: &str) -> io::Result<PathBuf> {
        let dir = self.path.join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
