use crate::calendar::iso_instant;
use crate::homework::HomeworkItem;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A completed focus interval. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    #[serde(default)]
    pub homework_id: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(deserialize_with = "iso_instant::deserialize")]
    pub start_time: NaiveDateTime,
    pub duration_minutes: u32,
}

impl StudySession {
    /// Build the record for a finished focus interval.
    ///
    /// The class is resolved from the linked homework as it is now; a missing
    /// or unknown homework id leaves the class unset while the homework id is
    /// kept as given.
    pub fn completed(
        homework_id: Option<&str>,
        homework: &[HomeworkItem],
        start_time: NaiveDateTime,
        duration_minutes: u32,
    ) -> Self {
        let class_id = homework_id
            .and_then(|id| homework.iter().find(|item| item.id == id))
            .map(|item| item.class_id.clone())
            .filter(|class_id| !class_id.is_empty());

        Self {
            id: Uuid::new_v4().to_string(),
            homework_id: homework_id.map(str::to_string),
            class_id,
            start_time,
            duration_minutes,
        }
    }
}

pub fn total_minutes(sessions: &[StudySession]) -> u64 {
    sessions
        .iter()
        .map(|session| u64::from(session.duration_minutes))
        .sum()
}
