use crate::calendar::iso_instant;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_complete: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            is_complete: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkItem {
    pub id: String,
    pub title: String,
    /// Reference to a class; may dangle after the class is deleted.
    #[serde(default)]
    pub class_id: String,
    #[serde(deserialize_with = "iso_instant::deserialize")]
    pub due_date: NaiveDateTime,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default, deserialize_with = "iso_instant::deserialize_seq")]
    pub reminders: Vec<NaiveDateTime>,
}

impl HomeworkItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        class_id: impl Into<String>,
        due_date: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            class_id: class_id.into(),
            due_date,
            notes: String::new(),
            is_complete: false,
            subtasks: Vec::new(),
            reminders: Vec::new(),
        }
    }

    /// Same as [`HomeworkItem::new`] with a freshly generated id.
    pub fn draft(title: impl Into<String>, class_id: impl Into<String>, due_date: NaiveDateTime) -> Self {
        Self::new(Uuid::new_v4().to_string(), title, class_id, due_date)
    }

    pub fn due_day(&self) -> NaiveDate {
        self.due_date.date()
    }

    /// Appends a subtask; blank titles are ignored.
    pub fn add_subtask(&mut self, title: &str) -> Option<&Subtask> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        self.subtasks.push(Subtask::new(title));
        self.subtasks.last()
    }

    pub fn toggle_subtask(&mut self, id: &str) -> bool {
        match self.subtasks.iter_mut().find(|subtask| subtask.id == id) {
            Some(subtask) => {
                subtask.is_complete = !subtask.is_complete;
                true
            }
            None => false,
        }
    }

    pub fn delete_subtask(&mut self, id: &str) -> bool {
        let before = self.subtasks.len();
        self.subtasks.retain(|subtask| subtask.id != id);
        self.subtasks.len() != before
    }

    /// `(completed, total)` subtasks.
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|subtask| subtask.is_complete).count();
        (done, self.subtasks.len())
    }

    pub fn add_reminder(&mut self, at: NaiveDateTime) {
        self.reminders.push(at);
    }

    pub fn remove_reminder(&mut self, at: NaiveDateTime) -> bool {
        let before = self.reminders.len();
        self.reminders.retain(|reminder| *reminder != at);
        self.reminders.len() != before
    }
}
