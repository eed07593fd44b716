use chrono::{Datelike, NaiveDate, Weekday};
use homework_planner::calendar::{
    count_weekdays_from, date_key, is_weekend, month_grid, parse_date_key, parse_instant,
    parse_weekday, same_calendar_day, truncate_to_midnight, weekday_name,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn date_key_is_zero_padded_and_ignores_time() {
    let instant = date(2024, 3, 7).and_hms_opt(23, 59, 0).unwrap();
    assert_eq!(date_key(&instant), "2024-03-07");
    assert_eq!(date_key(&date(2024, 3, 7)), "2024-03-07");
    assert_eq!(parse_date_key("2024-03-07"), Some(date(2024, 3, 7)));
    assert_eq!(parse_date_key("03/07/2024"), None);
}

#[test]
fn same_day_compares_calendar_fields_only() {
    let morning = date(2024, 5, 1).and_hms_opt(0, 0, 1).unwrap();
    let night = date(2024, 5, 1).and_hms_opt(23, 0, 0).unwrap();
    assert!(same_calendar_day(&morning, &night));
    assert!(same_calendar_day(&morning, &date(2024, 5, 1)));
    assert!(!same_calendar_day(&night, &date(2024, 5, 2)));
    assert_eq!(truncate_to_midnight(night), date(2024, 5, 1).and_hms_opt(0, 0, 0).unwrap());
}

#[test]
fn parse_instant_accepts_naive_and_bare_dates() {
    assert_eq!(
        parse_instant("2024-01-02T15:30:00"),
        Some(date(2024, 1, 2).and_hms_opt(15, 30, 0).unwrap())
    );
    assert_eq!(
        parse_instant("2024-01-02T15:30"),
        Some(date(2024, 1, 2).and_hms_opt(15, 30, 0).unwrap())
    );
    assert_eq!(
        parse_instant("2024-01-02"),
        Some(date(2024, 1, 2).and_hms_opt(0, 0, 0).unwrap())
    );
    assert!(parse_instant("2024-01-02T12:00:00Z").is_some());
    assert_eq!(parse_instant("not a date"), None);
}

#[test]
fn weekend_detection_and_names() {
    // 2024-01-06 is a Saturday
    assert!(is_weekend(date(2024, 1, 6)));
    assert!(is_weekend(date(2024, 1, 7)));
    assert!(!is_weekend(date(2024, 1, 8)));
    assert_eq!(weekday_name(Weekday::Wed), "Wednesday");
    assert_eq!(parse_weekday("monday"), Some(Weekday::Mon));
    assert_eq!(parse_weekday("Fri"), Some(Weekday::Fri));
    assert_eq!(parse_weekday("Funday"), None);
}

#[test]
fn weekday_count_includes_the_start_day() {
    let monday = date(2024, 1, 1);
    assert_eq!(count_weekdays_from(monday, 0), 0);
    assert_eq!(count_weekdays_from(monday, 1), 1);
    // Mon..Sun
    assert_eq!(count_weekdays_from(monday, 7), 5);
    // starting on a Saturday the first two days do not count
    assert_eq!(count_weekdays_from(date(2024, 1, 6), 2), 0);
    assert_eq!(count_weekdays_from(date(2024, 1, 6), 3), 1);
}

#[test]
fn month_grid_pads_to_whole_weeks() {
    // February 2024 starts on a Thursday and ends on a Thursday
    let grid = month_grid(2024, 2);
    assert_eq!(grid.len() % 7, 0);
    assert_eq!(grid.first().copied(), Some(date(2024, 1, 28)));
    assert_eq!(grid.last().copied(), Some(date(2024, 3, 2)));
    assert_eq!(grid.first().unwrap().weekday(), Weekday::Sun);
    assert_eq!(grid.last().unwrap().weekday(), Weekday::Sat);
    assert!(grid.contains(&date(2024, 2, 29)));
}

#[test]
fn month_grid_rejects_invalid_month() {
    assert!(month_grid(2024, 13).is_empty());
    assert!(month_grid(2024, 0).is_empty());
}

#[test]
fn month_grid_at_the_ends_of_the_date_range_never_panics() {
    // the earliest representable day is not a Sunday, so its month cannot be padded
    assert_ne!(NaiveDate::MIN.weekday(), Weekday::Sun);
    assert!(month_grid(NaiveDate::MIN.year(), 1).is_empty());

    let last = month_grid(NaiveDate::MAX.year(), 12);
    assert_eq!(last.len() % 7, 0);

    let mid = month_grid(NaiveDate::MIN.year(), 6);
    assert!(!mid.is_empty());
    assert_eq!(mid.len() % 7, 0);
    assert_eq!(mid[0].weekday(), Weekday::Sun);
}
