use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use directories::ProjectDirs;
use rand::Rng;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    constants::{GRID, STORAGE},
    domain::{Card, seed_cards},
    layout,
};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not serialize board: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub trait SlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: SlotStore + ?Sized> SlotStore for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

#[derive(Clone, Debug)]
pub struct FileSlotStore {
    dir: PathBuf,
}

impl FileSlotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SlotStore for FileSlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let dir = self.dir();
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        atomic_write(&self.slot_path(key), value)
    }
}

#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: RefCell<HashMap<String, String>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_slot(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl SlotStore for MemorySlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// Missing slot gives the seed cards; unreadable or malformed gives an empty board.
pub fn load_cards<S: SlotStore + ?Sized, R: Rng + ?Sized>(store: &S, rng: &mut R) -> Vec<Card> {
    let raw = match store.read(STORAGE.slot_key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("no stored board, using seed cards");
            return seed_cards(rng);
        }
        Err(e) => {
            warn!("could not read stored board: {}", e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Card>>(&raw) {
        Ok(cards) => normalize_cards(cards),
        Err(e) => {
            warn!("stored board is malformed, starting empty: {}", e);
            Vec::new()
        }
    }
}

pub fn save_cards<S: SlotStore + ?Sized>(store: &S, cards: &[Card]) -> Result<(), StorageError> {
    let json = serde_json::to_string(cards)?;
    store.write(STORAGE.slot_key, &json)
}

// Unique card ids, unique row ids per card, `layout.i == id`, bounded geometry.
pub fn normalize_cards(cards: Vec<Card>) -> Vec<Card> {
    let mut seen = HashSet::new();
    cards
        .into_iter()
        .filter(|card| {
            let fresh = seen.insert(card.id.clone());
            if !fresh {
                warn!("dropping duplicate card id {}", card.id);
            }
            fresh
        })
        .map(|mut card| {
            card.layout.i = card.id.clone();
            let cols = layout::max_columns();
            card.layout.w = card.layout.w.clamp(1, cols);
            card.layout.x = card.layout.x.min(cols - card.layout.w);
            card.layout.h = card.layout.h.clamp(1, GRID.max_h);
            card.layout.y = card.layout.y.min(GRID.max_row);
            let mut row_ids = HashSet::new();
            card.rows.retain(|row| row_ids.insert(row.id.clone()));
            card
        })
        .collect()
}

pub fn get_data_dir() -> PathBuf {
    if let Some(proj_dirs) =
        ProjectDirs::from(STORAGE.qualifier, STORAGE.organization, STORAGE.application)
    {
        proj_dirs.data_dir().to_path_buf()
    } else {
        PathBuf::from(".")
    }
}

pub fn get_state_dir() -> PathBuf {
    if let Some(proj_dirs) =
        ProjectDirs::from(STORAGE.qualifier, STORAGE.organization, STORAGE.application)
    {
        if let Some(state_dir) = proj_dirs.state_dir() {
            let dir = state_dir.to_path_buf();
            fs::create_dir_all(&dir).ok();
            return dir;
        }
    }
    get_data_dir()
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, &json)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let content = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

pub fn create_backup(path: &Path) -> Result<(), StorageError> {
    if !path.exists() {
        return Ok(());
    }

    let backup_dir = path.parent().unwrap_or(Path::new(".")).join("backups");
    fs::create_dir_all(&backup_dir).map_err(|e| StorageError::io(&backup_dir, e))?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S%3f");
    let filename = format!(
        "{}.{}",
        path.file_name().unwrap_or_default().to_string_lossy(),
        timestamp
    );
    let backup_path = backup_dir.join(&filename);
    fs::copy(path, &backup_path).map_err(|e| StorageError::io(&backup_path, e))?;

    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    if let Ok(entries) = fs::read_dir(&backup_dir) {
        let mut backups: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(&*stem))
            .collect();
        backups.sort_by_key(|e| e.file_name());

        while backups.len() > STORAGE.max_backups {
            let oldest = backups.remove(0);
            let _ = fs::remove_file(oldest.path());
        }
    }

    Ok(())
}

pub fn atomic_write(path: &Path, content: &str) -> Result<(), StorageError> {
    if path.exists() {
        create_backup(path)?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path).map_err(|e| StorageError::io(&tmp_path, e))?;
    tmp_file
        .write_all(content.as_bytes())
        .map_err(|e| StorageError::io(&tmp_path, e))?;
    tmp_file
        .sync_all()
        .map_err(|e| StorageError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| StorageError::io(path, e))?;
    Ok(())
}
