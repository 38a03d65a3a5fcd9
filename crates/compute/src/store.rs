use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{info, warn};

use shiftwatch_core::{Baseline, Result, ShiftError};

/// Durable holder of the single active baseline.
///
/// Readers get an `Arc` snapshot and never observe a half-applied update.
/// Writers are serialized and the document on disk is replaced atomically
/// (temp file + rename), so a crash leaves either the old or the new one.
pub struct BaselineStore {
    path: PathBuf,
    current: RwLock<Arc<Baseline>>,
    write_lock: Mutex<()>,
}

impl BaselineStore {
    /// Load the baseline at `path`, creating the default reference if absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let baseline = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| ShiftError::Persistence(format!("read {}: {}", path.display(), e)))?;
            let baseline: Baseline = serde_json::from_str(&raw)
                .map_err(|e| ShiftError::Persistence(format!("parse {}: {}", path.display(), e)))?;
            baseline.validate()?;
            info!(path = %path.display(), updated_at = %baseline.updated_at, "loaded baseline");
            baseline
        } else {
            let baseline = Baseline::default_reference();
            write_atomic(&path, &baseline)?;
            warn!(path = %path.display(), "no baseline found; wrote default reference, update it with real traffic values");
            baseline
        };

        Ok(Self {
            path,
            current: RwLock::new(Arc::new(baseline)),
            write_lock: Mutex::new(()),
        })
    }

    /// Snapshot of the active baseline.
    pub fn get(&self) -> Arc<Baseline> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Validate, persist, then swap in `baseline`.
    ///
    /// On any error neither the file nor the in-memory value changes.
    pub fn replace(&self, baseline: Baseline) -> Result<Arc<Baseline>> {
        baseline.validate()?;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        write_atomic(&self.path, &baseline)?;

        let baseline = Arc::new(baseline);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&baseline);
        info!(
            path = %self.path.display(),
            avg_text_length = baseline.avg_text_length,
            languages = baseline.language_distribution.len(),
            "baseline replaced"
        );
        Ok(baseline)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_atomic(path: &Path, baseline: &Baseline) -> Result<()> {
    let persist = |e: std::io::Error| ShiftError::Persistence(format!("write {}: {}", path.display(), e));

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(persist)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "baseline.json".to_string());
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    let json = serde_json::to_vec_pretty(baseline)?;
    let mut file = fs::File::create(&tmp_path).map_err(persist)?;
    file.write_all(&json).map_err(persist)?;
    file.sync_all().map_err(persist)?;
    drop(file);

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(persist(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn custom() -> Baseline {
        Baseline {
            avg_text_length: 140.0,
            text_length_std: 35.0,
            language_distribution: BTreeMap::from([("en".to_string(), 60.0), ("pt".to_string(), 40.0)]),
            avg_request_volume: 25.0,
            updated_at: Utc::now(),
            description: Some("weekday traffic".to_string()),
        }
    }

    #[test]
    fn open_creates_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("baseline.json");
        let store = BaselineStore::open(&path).unwrap();

        assert!(path.exists());
        assert_eq!(store.get().avg_text_length, 100.0);
        assert_eq!(store.get().language_distribution["en"], 80.0);
    }

    #[test]
    fn replace_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseline.json");

        let store = BaselineStore::open(&path).unwrap();
        store.replace(custom()).unwrap();
        assert_eq!(store.get().avg_text_length, 140.0);
        assert!(!dir.path().join(".baseline.json.tmp").exists());

        let reopened = BaselineStore::open(&path).unwrap();
        assert_eq!(*reopened.get(), *store.get());
    }

    #[test]
    fn invalid_replace_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseline.json");
        let store = BaselineStore::open(&path).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let mut bad = custom();
        bad.avg_request_volume = -3.0;
        assert!(matches!(store.replace(bad), Err(ShiftError::Validation(_))));

        assert_eq!(store.get().avg_text_length, 100.0);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn failed_write_keeps_old_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseline.json");
        let store = BaselineStore::open(&path).unwrap();
        let before = fs::read(&path).unwrap();
        fs::create_dir(dir.path().join(".baseline.json.tmp")).unwrap();

        assert!(matches!(store.replace(custom()), Err(ShiftError::Persistence(_))));
        assert_eq!(store.get().avg_text_length, 100.0);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn corrupt_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseline.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(BaselineStore::open(&path), Err(ShiftError::Persistence(_))));
    }

    #[test]
    fn snapshot_survives_replace() {
        let dir = tempfile::tempdir().unwrap();
        let store = BaselineStore::open(dir.path().join("baseline.json")).unwrap();
        let old = store.get();
        store.replace(custom()).unwrap();
        assert_eq!(old.avg_text_length, 100.0);
        assert_eq!(store.get().avg_text_length, 140.0);
    }
}
