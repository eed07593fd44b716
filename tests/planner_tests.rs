use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};
use homework_planner::{
    ClassRecord, DayClassification, DayType, HomeworkItem, KeyValueStore, Ledger, LedgerError,
    MemoryStore, Planner, ScheduleSettings, ScheduleType, UserKey, UserProfile,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, 0, 0).unwrap()
}

fn open(store: &Arc<MemoryStore>, user: &str) -> Planner {
    let store: Arc<dyn KeyValueStore> = store.clone();
    Planner::open(store, UserKey::User(user.into()))
}

fn planner_with_rotation(store: &Arc<MemoryStore>) -> Planner {
    let mut planner = open(store, "student");
    planner.set_schedule_settings(Some(ScheduleSettings::new(d(2024, 1, 1), DayType::A, false)));
    planner
}

#[test]
fn classification_follows_settings_and_overrides() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = open(&store, "student");
    assert_eq!(planner.classify(d(2024, 1, 2)), DayClassification::None);

    planner.set_schedule_settings(Some(ScheduleSettings::new(d(2024, 1, 1), DayType::A, false)));
    assert_eq!(planner.classify(d(2024, 1, 2)), DayClassification::B);
    assert_eq!(planner.classify(d(2024, 1, 8)), DayClassification::B);

    planner.set_override(d(2024, 1, 6), DayClassification::A);
    assert_eq!(planner.classify(d(2024, 1, 6)), DayClassification::A);
    assert_eq!(planner.get_override(d(2024, 1, 6)), Some(DayType::A));

    planner.set_override(d(2024, 1, 6), DayClassification::None);
    assert_eq!(planner.classify(d(2024, 1, 6)), DayClassification::None);
    assert_eq!(planner.classify_instant(at(d(2024, 1, 3), 22)), DayClassification::A);
}

#[test]
fn add_class_assigns_ids_and_drops_days_for_rotation_classes() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = planner_with_rotation(&store);

    let chem = planner
        .add_class("  Chemistry ", "#f00", ScheduleType::ADay, vec![Weekday::Mon])
        .unwrap();
    assert_eq!(chem.name, "Chemistry");
    assert!(chem.days_of_week.is_empty());

    let band = planner
        .add_class("Band", "#00f", ScheduleType::Everyday, vec![Weekday::Tue])
        .unwrap();
    assert_ne!(chem.id, band.id);
    assert_eq!(band.days_of_week, vec![Weekday::Tue]);

    let err = planner
        .add_class("   ", "#000", ScheduleType::BDay, Vec::new())
        .unwrap_err();
    assert_eq!(err, LedgerError::BlankName { entity: "class" });
    assert_eq!(planner.classes().len(), 2);
}

#[test]
fn scheduled_classes_use_the_day_classification() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = planner_with_rotation(&store);
    let x = planner.add_class("X", "#111", ScheduleType::ADay, Vec::new()).unwrap();
    let band = planner
        .add_class("Band", "#222", ScheduleType::Everyday, vec![Weekday::Tue])
        .unwrap();

    // Tuesday 2024-01-02 is a B day
    let tuesday: Vec<String> = planner
        .classes_scheduled_on(d(2024, 1, 2))
        .into_iter()
        .map(|class| class.id.clone())
        .collect();
    assert_eq!(tuesday, vec![band.id.clone()]);

    // Wednesday 2024-01-03 is an A day
    let wednesday: Vec<String> = planner
        .classes_scheduled_on(d(2024, 1, 3))
        .into_iter()
        .map(|class| class.id.clone())
        .collect();
    assert_eq!(wednesday, vec![x.id.clone()]);
}

#[test]
fn deleting_a_class_leaves_homework_dangling() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = planner_with_rotation(&store);
    let class = planner.add_class("Math", "#333", ScheduleType::Everyday, vec![Weekday::Mon]).unwrap();
    let item = HomeworkItem::draft("Problem set", class.id.clone(), at(d(2024, 1, 4), 9));
    planner.add_or_update_homework(item.clone()).unwrap();
    assert_eq!(planner.class_for(&item).map(|c| c.name.as_str()), Some("Math"));

    assert!(planner.delete_class(&class.id));
    assert!(!planner.delete_class(&class.id));
    assert_eq!(planner.homework().len(), 1);
    assert!(planner.class_for(&item).is_none());
}

#[test]
fn update_class_replaces_in_place() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = planner_with_rotation(&store);
    let class = planner.add_class("Art", "#444", ScheduleType::ADay, Vec::new()).unwrap();

    let renamed = ClassRecord::new(class.id.clone(), "Studio Art", "#555", ScheduleType::BDay)
        .with_days([Weekday::Fri]);
    assert_eq!(planner.update_class(renamed), Ok(true));
    let stored = planner.find_class(&class.id).unwrap();
    assert_eq!(stored.name, "Studio Art");
    assert_eq!(stored.schedule_type, ScheduleType::BDay);
    assert!(stored.days_of_week.is_empty());

    let missing = ClassRecord::new("nope", "Ghost", "#000", ScheduleType::ADay);
    assert_eq!(planner.update_class(missing), Ok(false));
}

#[test]
fn homework_upsert_toggle_and_delete() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = planner_with_rotation(&store);
    let today = d(2024, 2, 5);

    let first = HomeworkItem::new("h-1", "Read", "", at(today, 9));
    let second = HomeworkItem::new("h-2", "Write", "", at(today + Duration::days(1), 9));
    planner.add_or_update_homework(first.clone()).unwrap();
    planner.add_or_update_homework(second).unwrap();

    let mut edited = first.clone();
    edited.title = "Read chapter 4".into();
    planner.add_or_update_homework(edited).unwrap();
    assert_eq!(planner.homework().len(), 2);
    assert_eq!(planner.homework()[0].title, "Read chapter 4");

    assert_eq!(planner.homework_due_today(today).len(), 1);
    assert_eq!(planner.homework_due_tomorrow(today).len(), 1);

    assert!(planner.toggle_complete("h-1"));
    assert!(planner.homework_due_today(today).is_empty());
    assert_eq!(planner.homework_on(today).len(), 1);
    assert_eq!(planner.completion_streak(today), 1);

    assert!(!planner.toggle_complete("missing"));
    assert!(!planner.delete_homework("missing"));
    assert!(planner.delete_homework("h-2"));
    assert_eq!(planner.homework().len(), 1);

    let err = planner
        .add_or_update_homework(HomeworkItem::new("h-3", "  ", "", at(today, 9)))
        .unwrap_err();
    assert_eq!(err, LedgerError::BlankName { entity: "homework" });
}

#[test]
fn edit_homework_manages_subtasks_and_reminders() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = open(&store, "student");
    let due = at(d(2024, 2, 9), 8);
    planner
        .add_or_update_homework(HomeworkItem::new("h-1", "Project", "", due))
        .unwrap();

    assert!(planner.edit_homework("h-1", |item| {
        item.add_subtask("Research");
        item.add_subtask("   ");
        item.add_subtask("Slides");
        item.add_reminder(at(d(2024, 2, 8), 18));
    }));
    let item = planner.find_homework("h-1").unwrap();
    assert_eq!(item.subtask_progress(), (0, 2));
    assert_eq!(item.reminders.len(), 1);

    let subtask_id = item.subtasks[0].id.clone();
    assert!(planner.edit_homework("h-1", |item| {
        item.toggle_subtask(&subtask_id);
    }));
    assert_eq!(planner.find_homework("h-1").unwrap().subtask_progress(), (1, 2));
    assert!(!planner.edit_homework("missing", |_| {}));

    let slides_id = planner.find_homework("h-1").unwrap().subtasks[1].id.clone();
    assert!(planner.edit_homework("h-1", |item| {
        assert!(item.delete_subtask(&slides_id));
        assert!(!item.delete_subtask(&slides_id));
        assert!(item.remove_reminder(at(d(2024, 2, 8), 18)));
    }));
    let item = planner.find_homework("h-1").unwrap();
    assert_eq!(item.subtask_progress(), (1, 1));
    assert!(item.reminders.is_empty());

    // the edit reached the store
    let reopened = open(&store, "student");
    assert_eq!(reopened.find_homework("h-1").unwrap().subtask_progress(), (1, 1));
}

#[test]
fn sessions_resolve_class_and_feed_progress() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = planner_with_rotation(&store);
    let class = planner.add_class("Physics", "#666", ScheduleType::BDay, Vec::new()).unwrap();
    let item = HomeworkItem::draft("Lab", class.id.clone(), at(d(2024, 3, 1), 9));
    let homework_id = item.id.clone();
    planner.add_or_update_homework(item).unwrap();

    let session = planner
        .record_session(Some(homework_id.as_str()), at(d(2024, 2, 29), 17), 50)
        .unwrap();
    assert_eq!(session.class_id.as_deref(), Some(class.id.as_str()));
    planner.record_session(None, at(d(2024, 2, 29), 19), 25).unwrap();

    let err = planner.record_session(None, at(d(2024, 2, 29), 20), 0).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidDuration { .. }));

    let summary = planner.progress(d(2024, 3, 1));
    assert_eq!(summary.total_study_minutes, 75);
    assert_eq!(summary.study_time.to_string(), "1h 15m");
    assert_eq!(planner.sessions().len(), 2);
}

#[test]
fn nudge_reports_upcoming_homework() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = open(&store, "student");
    let today = d(2024, 4, 1);
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(planner.upcoming_nudge(today, &mut rng), None);

    planner
        .add_or_update_homework(HomeworkItem::new("h", "Quiz prep", "", at(today + Duration::days(1), 8)))
        .unwrap();
    assert_eq!(
        planner.upcoming_nudge(today, &mut rng).as_deref(),
        Some("Don't forget 'Quiz prep' is due tomorrow. You got this!")
    );
}

#[test]
fn month_view_marks_rotation_homework_and_today() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = planner_with_rotation(&store);
    planner
        .add_or_update_homework(HomeworkItem::new("h", "Essay", "", at(d(2024, 1, 10), 9)))
        .unwrap();

    let cells = planner.month_view(2024, 1, d(2024, 1, 10));
    // January 2024 starts on Monday: the grid opens on Sunday 2023-12-31
    assert_eq!(cells.first().map(|cell| cell.date), Some(d(2023, 12, 31)));
    assert!(!cells[0].in_month);
    assert_eq!(cells[0].classification, DayClassification::None);

    let jan_1 = &cells[1];
    assert!(jan_1.in_month);
    assert_eq!(jan_1.classification, DayClassification::A);

    let jan_10 = cells.iter().find(|cell| cell.date == d(2024, 1, 10)).unwrap();
    assert!(jan_10.is_today);
    assert_eq!(jan_10.homework_due, 1);
    assert_eq!(cells.iter().filter(|cell| cell.is_today).count(), 1);
}

#[test]
fn every_mutation_is_persisted_for_named_users() {
    let store = Arc::new(MemoryStore::new());
    {
        let mut planner = planner_with_rotation(&store);
        planner.set_override(d(2024, 1, 6), DayClassification::B);
        planner.add_class("Choir", "#777", ScheduleType::Everyday, vec![Weekday::Fri]).unwrap();
        planner
            .add_or_update_homework(HomeworkItem::new("h", "Sing", "", at(d(2024, 1, 5), 9)))
            .unwrap();
        planner.record_session(Some("h"), at(d(2024, 1, 4), 9), 30).unwrap();
        planner.update_profile(UserProfile {
            name: "Jo March".into(),
            ..UserProfile::default()
        });
    }

    let planner = open(&store, "student");
    assert_eq!(planner.classify(d(2024, 1, 6)), DayClassification::B);
    assert_eq!(planner.classes().len(), 1);
    assert_eq!(planner.homework().len(), 1);
    assert_eq!(planner.sessions().len(), 1);
    assert_eq!(planner.profile().name, "Jo March");
    assert_eq!(planner.profile().initials(), "JM");
}

#[test]
fn guest_sessions_are_memory_only() {
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn KeyValueStore> = store.clone();
    let mut planner = Planner::open(shared, UserKey::Guest);
    assert!(planner.is_guest());
    assert_eq!(planner.profile(), &UserProfile::guest());

    planner.add_class("Gym", "#888", ScheduleType::ADay, Vec::new()).unwrap();
    planner
        .add_or_update_homework(HomeworkItem::new("h", "Laps", "", at(d(2024, 1, 5), 9)))
        .unwrap();
    assert_eq!(planner.classes().len(), 1);
    assert!(store.keys().unwrap().is_empty());

    let fresh = Planner::guest();
    assert!(fresh.homework().is_empty());
}

#[test]
fn switching_users_swaps_whole_ledgers() {
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn KeyValueStore> = store.clone();
    let mut planner = Planner::open(shared, UserKey::Guest);
    planner
        .add_or_update_homework(HomeworkItem::new("g", "Guest work", "", at(d(2024, 1, 5), 9)))
        .unwrap();

    planner.switch_user(UserKey::User("kim".into()));
    assert_eq!(planner.user(), &UserKey::User("kim".into()));
    assert!(planner.homework().is_empty());
    assert_eq!(planner.profile(), &UserProfile::default());
    planner
        .add_or_update_homework(HomeworkItem::new("k", "Kim work", "", at(d(2024, 1, 5), 9)))
        .unwrap();
    assert_eq!(
        homework_planner::persistence::load_active_user(store.as_ref()),
        Some(UserKey::User("kim".into()))
    );

    planner.switch_user(UserKey::User("lee".into()));
    assert!(planner.homework().is_empty());

    planner.switch_user(UserKey::User("kim".into()));
    assert_eq!(planner.homework()[0].id, "k");

    planner.logout();
    assert!(planner.is_guest());
    assert_eq!(homework_planner::persistence::load_active_user(store.as_ref()), None);
}

#[test]
fn reset_erases_the_current_user_only() {
    let store = Arc::new(MemoryStore::new());
    let mut other = open(&store, "other");
    other
        .add_or_update_homework(HomeworkItem::new("o", "Other", "", at(d(2024, 1, 5), 9)))
        .unwrap();

    let mut planner = planner_with_rotation(&store);
    planner
        .add_or_update_homework(HomeworkItem::new("s", "Mine", "", at(d(2024, 1, 5), 9)))
        .unwrap();
    planner.reset();
    assert!(planner.homework().is_empty());
    assert!(planner.settings().is_none());

    assert!(open(&store, "student").homework().is_empty());
    assert_eq!(open(&store, "other").homework().len(), 1);
}

#[test]
fn replace_ledger_validates_and_persists() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = open(&store, "student");

    let mut ledger = Ledger::default();
    ledger.homework.push(HomeworkItem::new("dup", "One", "", at(d(2024, 1, 5), 9)));
    ledger.homework.push(HomeworkItem::new("dup", "Two", "", at(d(2024, 1, 6), 9)));
    assert!(matches!(
        planner.replace_ledger(ledger.clone()),
        Err(LedgerError::DuplicateId { entity: "homework", .. })
    ));
    assert!(planner.homework().is_empty());

    ledger.homework.pop();
    planner.replace_ledger(ledger).unwrap();
    assert_eq!(open(&store, "student").homework().len(), 1);
}
