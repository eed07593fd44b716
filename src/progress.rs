use crate::aggregate::completion_streak;
use crate::homework::HomeworkItem;
use crate::session::{StudySession, total_minutes};
use chrono::NaiveDate;
use serde::Serialize;

pub const RECENT_COMPLETED_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StudyTime {
    pub hours: u64,
    pub minutes: u64,
}

impl StudyTime {
    pub fn from_minutes(total: u64) -> Self {
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }
}

impl std::fmt::Display for StudyTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressSummary {
    pub completion_streak: u32,
    pub tasks_completed: usize,
    pub total_study_minutes: u64,
    pub study_time: StudyTime,
    /// Completed homework, latest due date first.
    pub recent_completed: Vec<HomeworkItem>,
}

impl ProgressSummary {
    pub fn to_cli_summary(&self) -> String {
        format!(
            "streak={} days, completed={}, study={}",
            self.completion_streak, self.tasks_completed, self.study_time
        )
    }
}

pub fn summarize(
    homework: &[HomeworkItem],
    sessions: &[StudySession],
    today: NaiveDate,
) -> ProgressSummary {
    let mut completed: Vec<&HomeworkItem> = homework.iter().filter(|item| item.is_complete).collect();
    let tasks_completed = completed.len();
    completed.sort_by(|a, b| b.due_date.cmp(&a.due_date));

    let total_study_minutes = total_minutes(sessions);

    ProgressSummary {
        completion_streak: completion_streak(homework, today),
        tasks_completed,
        total_study_minutes,
        study_time: StudyTime::from_minutes(total_study_minutes),
        recent_completed: completed
            .into_iter()
            .take(RECENT_COMPLETED_LIMIT)
            .cloned()
            .collect(),
    }
}
