//! JSON file snapshot store.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;

use super::PersistenceStore;
use crate::error::{Error, Result};
use crate::study::StudySnapshot;

/// A store that keeps one pretty-printed JSON file per study in a directory.
///
/// Every save writes the full snapshot to a temporary file in the same
/// directory and renames it over `<dir>/<study_id>.json`, so a crash
/// mid-write never leaves a truncated snapshot behind. Saves and loads take
/// an advisory lock on a sibling `<study_id>.lock` file: exclusive for
/// writes, shared for reads. Several processes can therefore point at the
/// same directory.
///
/// Study ids are mapped to file names by replacing every character outside
/// `[A-Za-z0-9._-]` with `_`.
///
/// # Examples
///
/// ```no_run
/// use hyperstudy::Study;
/// use hyperstudy::storage::JsonFileStore;
///
/// let store = JsonFileStore::new("studies").unwrap();
/// let study = Study::builder()
///     .name("lgbm-tuning")
///     .store(store)
///     .load_if_exists()
///     .build()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    /// Serialise in-process writes so we only hold the file lock briefly.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// The directory snapshots are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The snapshot file used for `study_id`.
    #[must_use]
    pub fn path_for(&self, study_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(study_id)))
    }

    fn lock_path(&self, study_id: &str) -> PathBuf {
        self.dir.join(format!("{}.lock", file_stem(study_id)))
    }

    fn open_lock_file(&self, study_id: &str) -> Result<File> {
        Ok(OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(study_id))?)
    }
}

impl PersistenceStore for JsonFileStore {
    fn save(&self, snapshot: &StudySnapshot) -> Result<()> {
        let _guard = self.write_lock.lock();
        let lock = self.open_lock_file(&snapshot.study_id)?;
        lock.lock_exclusive()?;

        let path = self.path_for(&snapshot.study_id);
        let tmp_path = self.dir.join(format!(
            ".{}.{}.tmp",
            file_stem(&snapshot.study_id),
            std::process::id()
        ));

        let result = write_json(&tmp_path, snapshot).and_then(|()| {
            fs::rename(&tmp_path, &path)?;
            Ok(())
        });
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }

        lock.unlock()?;
        result
    }

    fn load(&self, study_id: &str) -> Result<StudySnapshot> {
        let path = self.path_for(study_id);
        if !path.exists() {
            return Err(Error::NotFound(study_id.to_string()));
        }

        let lock = self.open_lock_file(study_id)?;
        lock.lock_shared()?;
        let result = read_json(&path, study_id);
        lock.unlock()?;

        let snapshot = result?;
        // Two ids can share a sanitized file name.
        if snapshot.study_id != study_id {
            return Err(Error::NotFound(study_id.to_string()));
        }
        Ok(snapshot)
    }
}

fn write_json(path: &Path, snapshot: &StudySnapshot) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

fn read_json(path: &Path, study_id: &str) -> Result<StudySnapshot> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::NotFound(study_id.to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn file_stem(study_id: &str) -> String {
    study_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
