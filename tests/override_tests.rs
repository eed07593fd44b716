use chrono::NaiveDate;
use homework_planner::{DayClassification, DayType, OverrideMap};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn last_write_wins_and_none_removes() {
    let mut overrides = OverrideMap::new();
    overrides.set(date(2024, 4, 1), DayClassification::A);
    overrides.set(date(2024, 4, 1), DayClassification::B);
    assert_eq!(overrides.get(date(2024, 4, 1)), Some(DayType::B));
    assert_eq!(overrides.len(), 1);

    overrides.set(date(2024, 4, 1), DayClassification::None);
    assert_eq!(overrides.get(date(2024, 4, 1)), None);
    assert!(overrides.is_empty());
}

#[test]
fn clearing_a_missing_override_is_a_no_op() {
    let mut overrides = OverrideMap::new();
    overrides.set(date(2024, 4, 2), DayClassification::None);
    assert!(overrides.is_empty());
}

#[test]
fn lookup_by_instant_uses_the_calendar_day() {
    let mut overrides = OverrideMap::new();
    overrides.set(date(2024, 4, 3), DayClassification::A);
    let afternoon = date(2024, 4, 3).and_hms_opt(14, 0, 0).unwrap();
    assert_eq!(overrides.get(afternoon), Some(DayType::A));
    assert_eq!(overrides.get_by_key("2024-04-03"), Some(DayType::A));
}

#[test]
fn serializes_as_a_date_keyed_object() {
    let mut overrides = OverrideMap::new();
    overrides.set(date(2024, 4, 5), DayClassification::B);
    overrides.set(date(2024, 4, 4), DayClassification::A);

    let json = serde_json::to_string(&overrides).unwrap();
    assert_eq!(json, r#"{"2024-04-04":"a","2024-04-05":"b"}"#);

    let restored: OverrideMap = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, overrides);
    let days: Vec<(NaiveDate, DayType)> = restored.iter().collect();
    assert_eq!(days, vec![(date(2024, 4, 4), DayType::A), (date(2024, 4, 5), DayType::B)]);
}

#[test]
fn stored_none_entries_are_dropped_on_load() {
    let restored: OverrideMap =
        serde_json::from_str(r#"{"2024-04-04":"none","2024-04-05":"a"}"#).unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored.get(date(2024, 4, 5)), Some(DayType::A));
}
