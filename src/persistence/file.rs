use super::{KeyValueStore, PersistenceError, PersistenceResult};
use crate::homework::{HomeworkItem, Subtask};
use crate::ledger::Ledger;
use crate::ledger_validation;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One pretty-printed JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new<P: AsRef<Path>>(root: P) -> PersistenceResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_key(key)))
    }
}

impl KeyValueStore for JsonDirStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&self, key: &str, value: &str) -> PersistenceResult<()> {
        // Re-indent so files stay readable; values that are not JSON are written as-is.
        let contents = match serde_json::from_str::<serde_json::Value>(value) {
            Ok(json) => serde_json::to_string_pretty(&json)?,
            Err(_) => value.to_string(),
        };
        fs::write(self.path_for(key), contents)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> PersistenceResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Escape everything outside `[A-Za-z0-9._-]` as `%XX` so distinct keys map to
/// distinct file names.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

pub fn save_ledger_to_json<P: AsRef<Path>>(ledger: &Ledger, path: P) -> PersistenceResult<()> {
    super::validate_ledger(ledger)?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, ledger)?;
    info!(path = %path.as_ref().display(), "ledger exported");
    Ok(())
}

pub fn load_ledger_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Ledger> {
    let file = File::open(path.as_ref())?;
    let ledger: Ledger = serde_json::from_reader(file)?;
    super::validate_ledger(&ledger)?;
    info!(path = %path.as_ref().display(), "ledger imported");
    Ok(ledger)
}

#[derive(Serialize, Deserialize)]
struct HomeworkCsvRecord {
    id: String,
    title: String,
    class_id: String,
    due_date: String,
    notes: String,
    is_complete: bool,
    subtasks: String,
    reminders: String,
}

impl From<&HomeworkItem> for HomeworkCsvRecord {
    fn from(item: &HomeworkItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            class_id: item.class_id.clone(),
            due_date: format_instant(item.due_date),
            notes: item.notes.clone(),
            is_complete: item.is_complete,
            subtasks: serde_json::to_string(&item.subtasks).unwrap_or_else(|_| "[]".to_string()),
            reminders: item
                .reminders
                .iter()
                .map(|reminder| format_instant(*reminder))
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

impl HomeworkCsvRecord {
    fn into_homework(self) -> PersistenceResult<HomeworkItem> {
        let mut item = HomeworkItem::new(self.id, self.title, self.class_id, parse_instant(&self.due_date)?);
        item.notes = self.notes;
        item.is_complete = self.is_complete;
        item.subtasks = if self.subtasks.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str::<Vec<Subtask>>(&self.subtasks)
                .map_err(|err| PersistenceError::InvalidData(format!("invalid subtasks: {err}")))?
        };
        item.reminders = split_instants(&self.reminders)?;
        Ok(item)
    }
}

pub fn save_homework_to_csv<P: AsRef<Path>>(homework: &[HomeworkItem], path: P) -> PersistenceResult<()> {
    ledger_validation::validate_homework_collection(homework)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for item in homework {
        writer.serialize(HomeworkCsvRecord::from(item))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_homework_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<HomeworkItem>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut homework = Vec::new();
    for record in reader.deserialize::<HomeworkCsvRecord>() {
        homework.push(record?.into_homework()?);
    }
    ledger_validation::validate_homework_collection(&homework)?;
    Ok(homework)
}

fn format_instant(instant: NaiveDateTime) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

fn parse_instant(input: &str) -> PersistenceResult<NaiveDateTime> {
    crate::calendar::parse_instant(input)
        .ok_or_else(|| PersistenceError::InvalidData(format!("invalid instant '{input}'")))
}

fn split_instants(input: &str) -> PersistenceResult<Vec<NaiveDateTime>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    input.split(';').map(|part| parse_instant(part.trim())).collect()
}
