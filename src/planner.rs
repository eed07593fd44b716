use crate::aggregate;
use crate::calendar::{self, month_grid};
use crate::class_record::{ClassRecord, ScheduleType};
use crate::homework::HomeworkItem;
use crate::ledger::Ledger;
use crate::ledger_validation::{self, LedgerError};
use crate::overrides::OverrideMap;
use crate::persistence::{
    KeyValueStore, MemoryStore, RecordKind, Repository, UserKey, save_active_user,
};
use crate::profile::UserProfile;
use crate::progress::{self, ProgressSummary};
use crate::rotation::{self, DayClassification, DayType, ScheduleSettings};
use crate::session::StudySession;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One day of a month view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub classification: DayClassification,
    /// Homework due that day, completed or not.
    pub homework_due: usize,
}

/// Owns the hydrated ledger of the active user and writes every mutation
/// back through the repository.
///
/// Queries never cache: each call classifies and aggregates from the
/// current ledger.
pub struct Planner {
    repository: Repository,
    ledger: Ledger,
}

impl Planner {
    pub fn open(store: Arc<dyn KeyValueStore>, user: UserKey) -> Self {
        let repository = Repository::new(store, user);
        let ledger = repository.load_ledger();
        info!(
            user = %repository.user(),
            classes = ledger.classes.len(),
            homework = ledger.homework.len(),
            sessions = ledger.sessions.len(),
            "ledger hydrated"
        );
        Self { repository, ledger }
    }

    /// Memory-only guest session.
    pub fn guest() -> Self {
        Self::open(Arc::new(MemoryStore::new()), UserKey::Guest)
    }

    pub fn user(&self) -> &UserKey {
        self.repository.user()
    }

    pub fn is_guest(&self) -> bool {
        self.user().is_guest()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn classes(&self) -> &[ClassRecord] {
        &self.ledger.classes
    }

    pub fn homework(&self) -> &[HomeworkItem] {
        &self.ledger.homework
    }

    pub fn sessions(&self) -> &[StudySession] {
        &self.ledger.sessions
    }

    pub fn settings(&self) -> Option<&ScheduleSettings> {
        self.ledger.settings.as_ref()
    }

    pub fn overrides(&self) -> &OverrideMap {
        &self.ledger.overrides
    }

    pub fn profile(&self) -> &UserProfile {
        &self.ledger.profile
    }

    /// Drop the current ledger and hydrate `user`'s. Guest data is discarded.
    pub fn switch_user(&mut self, user: UserKey) {
        let store = self.repository.store();
        if let Err(err) = save_active_user(store.as_ref(), Some(&user)) {
            warn!(error = %err, "failed to remember active user");
        }
        info!(from = %self.user(), to = %user, "switching user");
        *self = Self::open(store, user);
    }

    /// Log out: forget the active user and fall back to a fresh guest session.
    pub fn logout(&mut self) {
        let store = self.repository.store();
        if let Err(err) = save_active_user(store.as_ref(), None) {
            warn!(error = %err, "failed to forget active user");
        }
        info!(user = %self.user(), "logged out");
        *self = Self::open(store, UserKey::Guest);
    }

    /// Account reset: every record of the current user is removed.
    pub fn reset(&mut self) {
        if let Err(err) = self.repository.clear() {
            warn!(user = %self.user(), error = %err, "failed to clear stored records");
        }
        self.ledger = if self.is_guest() {
            Ledger::guest()
        } else {
            Ledger::default()
        };
        info!(user = %self.user(), "account reset");
    }

    /// Swap in an imported ledger wholesale.
    pub fn replace_ledger(&mut self, ledger: Ledger) -> Result<(), LedgerError> {
        ledger_validation::validate_ledger(&ledger)?;
        self.ledger = ledger;
        if let Err(err) = self.repository.save_ledger(&self.ledger) {
            warn!(user = %self.user(), error = %err, "failed to persist imported ledger");
        }
        info!(user = %self.user(), "ledger replaced");
        Ok(())
    }

    fn persist(&self, kind: RecordKind) {
        let result = match kind {
            RecordKind::Classes => self.repository.save(kind, &self.ledger.classes),
            RecordKind::Homework => self.repository.save(kind, &self.ledger.homework),
            RecordKind::Sessions => self.repository.save(kind, &self.ledger.sessions),
            RecordKind::ScheduleSettings => self.repository.save(kind, &self.ledger.settings),
            RecordKind::ScheduleOverrides => self.repository.save(kind, &self.ledger.overrides),
            RecordKind::Profile => self.repository.save(kind, &self.ledger.profile),
        };
        if let Err(err) = result {
            warn!(record = kind.as_str(), user = %self.user(), error = %err, "failed to persist record");
        }
    }

    // ----- rotation -----

    pub fn classify(&self, date: NaiveDate) -> DayClassification {
        rotation::classify(date, self.settings(), self.overrides())
    }

    pub fn classify_instant(&self, instant: NaiveDateTime) -> DayClassification {
        rotation::classify_instant(instant, self.settings(), self.overrides())
    }

    pub fn set_schedule_settings(&mut self, settings: Option<ScheduleSettings>) {
        debug!(?settings, "schedule settings replaced");
        self.ledger.settings = settings;
        self.persist(RecordKind::ScheduleSettings);
    }

    pub fn set_override(&mut self, date: NaiveDate, kind: DayClassification) {
        self.ledger.overrides.set(date, kind);
        self.persist(RecordKind::ScheduleOverrides);
    }

    pub fn get_override(&self, date: NaiveDate) -> Option<DayType> {
        self.ledger.overrides.get(date)
    }

    // ----- classes -----

    pub fn classes_scheduled_on(&self, date: NaiveDate) -> Vec<&ClassRecord> {
        aggregate::classes_scheduled_on(date, self.classes(), self.classify(date))
    }

    pub fn find_class(&self, id: &str) -> Option<&ClassRecord> {
        self.ledger.find_class(id)
    }

    pub fn class_for(&self, item: &HomeworkItem) -> Option<&ClassRecord> {
        self.ledger.class_for(item)
    }

    pub fn add_class(
        &mut self,
        name: &str,
        color: &str,
        schedule_type: ScheduleType,
        days_of_week: Vec<Weekday>,
    ) -> Result<ClassRecord, LedgerError> {
        let mut class = ClassRecord::new(Uuid::new_v4().to_string(), name.trim(), color, schedule_type);
        if schedule_type == ScheduleType::Everyday {
            class.days_of_week = days_of_week;
        }
        ledger_validation::validate_class(&class)?;
        debug!(id = %class.id, name = %class.name, "class added");
        self.ledger.classes.push(class.clone());
        self.persist(RecordKind::Classes);
        Ok(class)
    }

    /// Replace the class with the same id. Returns `false` when no such class exists.
    pub fn update_class(&mut self, mut class: ClassRecord) -> Result<bool, LedgerError> {
        if class.schedule_type != ScheduleType::Everyday {
            class.days_of_week.clear();
        }
        ledger_validation::validate_class(&class)?;
        let Some(slot) = self.ledger.classes.iter_mut().find(|existing| existing.id == class.id) else {
            return Ok(false);
        };
        *slot = class;
        self.persist(RecordKind::Classes);
        Ok(true)
    }

    /// Homework referencing the class is left untouched.
    pub fn delete_class(&mut self, id: &str) -> bool {
        let before = self.ledger.classes.len();
        self.ledger.classes.retain(|class| class.id != id);
        let removed = self.ledger.classes.len() != before;
        if removed {
            debug!(id, "class deleted");
            self.persist(RecordKind::Classes);
        }
        removed
    }

    // ----- homework -----

    pub fn find_homework(&self, id: &str) -> Option<&HomeworkItem> {
        self.ledger.find_homework(id)
    }

    pub fn homework_due_on<F>(&self, predicate: F) -> Vec<&HomeworkItem>
    where
        F: Fn(NaiveDate) -> bool,
    {
        aggregate::homework_due_on(predicate, self.homework())
    }

    pub fn homework_due_today(&self, today: NaiveDate) -> Vec<&HomeworkItem> {
        aggregate::homework_due_today(self.homework(), today)
    }

    pub fn homework_due_tomorrow(&self, today: NaiveDate) -> Vec<&HomeworkItem> {
        aggregate::homework_due_tomorrow(self.homework(), today)
    }

    pub fn homework_on(&self, date: NaiveDate) -> Vec<&HomeworkItem> {
        aggregate::homework_on(date, self.homework())
    }

    /// Replace the item with the same id in place, or append it.
    pub fn add_or_update_homework(&mut self, item: HomeworkItem) -> Result<(), LedgerError> {
        ledger_validation::validate_homework(&item)?;
        match self.ledger.homework.iter_mut().find(|existing| existing.id == item.id) {
            Some(slot) => {
                debug!(id = %item.id, "homework updated");
                *slot = item;
            }
            None => {
                debug!(id = %item.id, "homework added");
                self.ledger.homework.push(item);
            }
        }
        self.persist(RecordKind::Homework);
        Ok(())
    }

    /// Apply `edit` to one item (subtasks, reminders, notes). Unknown ids are a no-op.
    pub fn edit_homework<F>(&mut self, id: &str, edit: F) -> bool
    where
        F: FnOnce(&mut HomeworkItem),
    {
        let Some(item) = self.ledger.homework.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        edit(item);
        self.persist(RecordKind::Homework);
        true
    }

    pub fn toggle_complete(&mut self, id: &str) -> bool {
        self.edit_homework(id, |item| item.is_complete = !item.is_complete)
    }

    pub fn delete_homework(&mut self, id: &str) -> bool {
        let before = self.ledger.homework.len();
        self.ledger.homework.retain(|item| item.id != id);
        let removed = self.ledger.homework.len() != before;
        if removed {
            debug!(id, "homework deleted");
            self.persist(RecordKind::Homework);
        }
        removed
    }

    pub fn completion_streak(&self, today: NaiveDate) -> u32 {
        aggregate::completion_streak(self.homework(), today)
    }

    pub fn upcoming_nudge<R: Rng + ?Sized>(&self, today: NaiveDate, rng: &mut R) -> Option<String> {
        aggregate::upcoming_nudge(self.homework(), today, rng)
    }

    // ----- sessions, progress, views -----

    /// Consume a completed focus interval.
    pub fn record_session(
        &mut self,
        homework_id: Option<&str>,
        start_time: NaiveDateTime,
        duration_minutes: u32,
    ) -> Result<StudySession, LedgerError> {
        let session = StudySession::completed(homework_id, self.homework(), start_time, duration_minutes);
        ledger_validation::validate_session(&session)?;
        info!(
            id = %session.id,
            homework = ?session.homework_id,
            minutes = session.duration_minutes,
            "study session recorded"
        );
        self.ledger.sessions.push(session.clone());
        self.persist(RecordKind::Sessions);
        Ok(session)
    }

    pub fn progress(&self, today: NaiveDate) -> ProgressSummary {
        progress::summarize(self.homework(), self.sessions(), today)
    }

    pub fn month_view(&self, year: i32, month: u32, today: NaiveDate) -> Vec<CalendarCell> {
        month_grid(year, month)
            .into_iter()
            .map(|date| CalendarCell {
                date,
                in_month: date.month() == month && date.year() == year,
                is_today: calendar::same_calendar_day(&date, &today),
                classification: self.classify(date),
                homework_due: self.homework_on(date).len(),
            })
            .collect()
    }

    pub fn update_profile(&mut self, profile: UserProfile) {
        self.ledger.profile = profile;
        self.persist(RecordKind::Profile);
    }
}
