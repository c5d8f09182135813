// ── On-disk persistence ──
//
// Creation uses `create_new` so an existing store is detected by the open
// itself. Saves go through a temp file in the same directory and a rename,
// so readers see either the old store or the new one.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use super::error::RrdError;
use super::Rrd;

impl Rrd {
    /// Write this store to a new file at `path`.
    ///
    /// Fails with [`RrdError::AlreadyExists`] if anything is already there.
    pub fn create(&self, path: &Path) -> Result<(), RrdError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    RrdError::AlreadyExists(path.to_path_buf())
                } else {
                    RrdError::io(path, e)
                }
            })?;

        let result = self.write_to(BufWriter::new(&file), path).and_then(|()| {
            file.sync_all().map_err(|e| RrdError::io(path, e))
        });

        if result.is_err() {
            // Leave nothing half-written behind for the next collision check.
            let _ = fs::remove_file(path);
            return result;
        }
        debug!(path = %path.display(), "created store");
        Ok(())
    }

    /// Read and check the store at `path`.
    pub fn open(path: &Path) -> Result<Self, RrdError> {
        let raw = fs::read(path).map_err(|e| RrdError::io(path, e))?;
        let rrd: Self = serde_json::from_slice(&raw).map_err(|source| RrdError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        rrd.check()?;
        Ok(rrd)
    }

    /// Atomically replace the store at `path` with this one.
    pub fn save(&self, path: &Path) -> Result<(), RrdError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let tmp = NamedTempFile::new_in(dir).map_err(|e| RrdError::io(dir, e))?;
        self.write_to(BufWriter::new(tmp.as_file()), path)?;
        tmp.as_file().sync_all().map_err(|e| RrdError::io(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| RrdError::io(path, e.error))?;
        Ok(())
    }

    fn write_to<W: Write>(&self, mut writer: W, path: &Path) -> Result<(), RrdError> {
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(|e| RrdError::io(path, e))
    }
}
