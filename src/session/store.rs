//! JSON-per-session persistence.
//!
//! Each session is one pretty-printed JSON file named by its id. Every
//! mutation is a whole-file read-modify-rewrite; there is no transaction
//! log and no lock. Single-writer per session is an accepted assumption —
//! sessions are one child at one machine.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Who spoke a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    User,
}

/// One recorded utterance. Immutable once appended; `len` is the
/// whitespace-split word count derived at append time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub ts: String,
    pub role: Role,
    pub text: String,
    pub len: usize,
}

/// The unit of durability: one full session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub started: String,
    pub turns: Vec<Turn>,
    pub stars: u32,
}

/// Store over a directory of `{id}.json` files.
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, String> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create session dir {}: {}", dir.display(), e))?;
        Ok(Self { dir })
    }

    /// Create a new session file with an empty record and return its
    /// time-derived id.
    pub fn start_session(&self) -> Result<String, String> {
        let base = Local::now().format("%Y%m%d-%H%M%S").to_string();
        let mut id = base.clone();
        let mut n = 2;
        while self.session_path(&id).exists() {
            id = format!("{base}-{n}");
            n += 1;
        }

        let record = SessionRecord {
            id: id.clone(),
            started: Local::now().to_rfc3339(),
            turns: Vec::new(),
            stars: 0,
        };
        self.write_record(&record)?;
        Ok(id)
    }

    /// Append one turn, deriving its word count from the text.
    pub fn append_turn(&self, id: &str, role: Role, text: &str) -> Result<(), String> {
        let mut record = self.read_record(id)?;
        record.turns.push(Turn {
            ts: Local::now().to_rfc3339(),
            role,
            text: text.to_string(),
            len: text.split_whitespace().count(),
        });
        self.write_record(&record)
    }

    /// Overwrite the star counter. Idempotent.
    pub fn set_stars(&self, id: &str, stars: u32) -> Result<(), String> {
        let mut record = self.read_record(id)?;
        record.stars = stars;
        self.write_record(&record)
    }

    pub fn load(&self, id: &str) -> Result<SessionRecord, String> {
        self.read_record(id)
    }

    /// Read every session file in sorted filename order, skipping files
    /// that fail to read or parse.
    pub fn list_sessions(&self) -> Vec<SessionRecord> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to list session dir {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        paths
            .into_iter()
            .filter_map(|path| match read_record_file(&path) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping session file {}: {}", path.display(), e);
                    None
                }
            })
            .collect()
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read_record(&self, id: &str) -> Result<SessionRecord, String> {
        read_record_file(&self.session_path(id))
    }

    fn write_record(&self, record: &SessionRecord) -> Result<(), String> {
        let path = self.session_path(&record.id);
        let content = serde_json::to_string_pretty(record)
            .map_err(|e| format!("Failed to serialize session {}: {}", record.id, e))?;
        fs::write(&path, content)
            .map_err(|e| format!("Failed to write session {}: {}", path.display(), e))
    }
}

fn read_record_file(path: &Path) -> Result<SessionRecord, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}
