//! Pure queries combining day classification with the class/homework ledger.
//!
//! Nothing here caches; every call recomputes from the slices it is given.

use crate::calendar::date_key;
use crate::class_record::ClassRecord;
use crate::homework::HomeworkItem;
use crate::rotation::DayClassification;
use chrono::{Duration, NaiveDate};
use rand::Rng;
use std::collections::HashSet;

/// Days after today still covered by the nudge window.
pub const NUDGE_WINDOW_DAYS: i64 = 2;

/// Classes meeting on `date`, in ledger order.
pub fn classes_scheduled_on<'a>(
    date: NaiveDate,
    classes: &'a [ClassRecord],
    classification: DayClassification,
) -> Vec<&'a ClassRecord> {
    classes
        .iter()
        .filter(|class| class.is_scheduled_on(date, classification))
        .collect()
}

/// Incomplete homework whose due day satisfies `predicate`.
pub fn homework_due_on<'a, F>(predicate: F, homework: &'a [HomeworkItem]) -> Vec<&'a HomeworkItem>
where
    F: Fn(NaiveDate) -> bool,
{
    homework
        .iter()
        .filter(|item| !item.is_complete && predicate(item.due_day()))
        .collect()
}

pub fn homework_due_today(homework: &[HomeworkItem], today: NaiveDate) -> Vec<&HomeworkItem> {
    homework_due_on(|day| day == today, homework)
}

pub fn homework_due_tomorrow(homework: &[HomeworkItem], today: NaiveDate) -> Vec<&HomeworkItem> {
    let tomorrow = today + Duration::days(1);
    homework_due_on(|day| day == tomorrow, homework)
}

/// Every item due on `date`, completed or not.
pub fn homework_on(date: NaiveDate, homework: &[HomeworkItem]) -> Vec<&HomeworkItem> {
    homework
        .iter()
        .filter(|item| item.due_day() == date)
        .collect()
}

/// Consecutive days, ending today, with at least one completed item due.
///
/// Driven by due dates, not by when the work was ticked off.
pub fn completion_streak(homework: &[HomeworkItem], today: NaiveDate) -> u32 {
    let completed_days: HashSet<String> = homework
        .iter()
        .filter(|item| item.is_complete)
        .map(|item| date_key(&item.due_date))
        .collect();

    let mut streak = 0;
    let mut current = today;
    while completed_days.contains(&date_key(&current)) {
        streak += 1;
        current = current - Duration::days(1);
    }
    streak
}

/// Incomplete items due between today and [`NUDGE_WINDOW_DAYS`] later, inclusive.
pub fn upcoming_homework(homework: &[HomeworkItem], today: NaiveDate) -> Vec<&HomeworkItem> {
    let last = today + Duration::days(NUDGE_WINDOW_DAYS);
    homework_due_on(|day| day >= today && day <= last, homework)
}

/// Reminder for one upcoming item picked uniformly by `rng`.
pub fn upcoming_nudge<R: Rng + ?Sized>(
    homework: &[HomeworkItem],
    today: NaiveDate,
    rng: &mut R,
) -> Option<String> {
    let upcoming = upcoming_homework(homework, today);
    if upcoming.is_empty() {
        return None;
    }
    let item = upcoming[rng.random_range(0..upcoming.len())];
    Some(nudge_message(item, today))
}

pub fn nudge_message(item: &HomeworkItem, today: NaiveDate) -> String {
    format!(
        "Don't forget '{}' is due {}. You got this!",
        item.title,
        relative_day(item.due_day(), today)
    )
}

fn relative_day(day: NaiveDate, today: NaiveDate) -> String {
    match (day - today).num_days() {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {n} days"),
    }
}
