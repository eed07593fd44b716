use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Format used for override keys and streak membership.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

const NAIVE_INSTANT_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Canonical `YYYY-MM-DD` key of a local calendar day.
///
/// Accepts anything carrying a year/month/day, so an instant and the
/// midnight of the same day produce the same key.
pub fn date_key<D: Datelike>(date: &D) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

pub fn parse_date_key(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_KEY_FORMAT).ok()
}

pub fn same_calendar_day<A: Datelike, B: Datelike>(a: &A, b: &B) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

pub fn truncate_to_midnight(instant: NaiveDateTime) -> NaiveDateTime {
    instant.date().and_time(NaiveTime::MIN)
}

pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Parse an ISO-8601 instant.
///
/// RFC 3339 values carrying an offset are converted to local wall-clock time;
/// naive values and bare dates are taken as already local.
pub fn parse_instant(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for format in NAIVE_INSTANT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt);
        }
    }
    parse_date_key(input).map(midnight)
}

pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Long English weekday name, the form class schedules store.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parses long or short weekday names, case-insensitively.
pub fn parse_weekday(input: &str) -> Option<Weekday> {
    input.trim().parse::<Weekday>().ok()
}

/// Count the weekdays among the `days` calendar days starting at `start`
/// inclusive, i.e. `start, start + 1, .., start + days - 1`.
///
/// Every 7-day block holds exactly five weekdays, so only the trailing
/// partial week is walked.
pub fn count_weekdays_from(start: NaiveDate, days: i64) -> i64 {
    if days <= 0 {
        return 0;
    }
    let full_weeks = days / 7;
    let mut count = full_weeks * 5;
    let mut current = start + Duration::days(full_weeks * 7);
    for _ in 0..days % 7 {
        if !is_weekend(current) {
            count += 1;
        }
        current = current + Duration::days(1);
    }
    count
}

/// Days shown by a Sunday-start month grid: the whole month, padded back to
/// the preceding Sunday and forward to the following Saturday.
///
/// Returns an empty grid for an invalid month or one whose padded weeks
/// fall outside the representable date range.
pub fn month_grid(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let Some(last) = last_day_of_month(first) else {
        return Vec::new();
    };

    // Padding can run past the representable range at the extremes.
    let Some(start) =
        first.checked_sub_signed(Duration::days(first.weekday().num_days_from_sunday() as i64))
    else {
        return Vec::new();
    };
    let Some(end) =
        last.checked_add_signed(Duration::days(6 - last.weekday().num_days_from_sunday() as i64))
    else {
        return Vec::new();
    };

    let mut days = Vec::new();
    let mut current = Some(start);
    while let Some(day) = current.filter(|day| *day <= end) {
        days.push(day);
        current = day.succ_opt();
    }
    days
}

/// Deserializes instants through [`parse_instant`], so offset-carrying
/// values such as `2024-01-05T15:00:00.000Z` are accepted alongside the
/// naive form written back out.
pub(crate) mod iso_instant {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, de};

    fn parse<E: de::Error>(raw: &str) -> Result<NaiveDateTime, E> {
        super::parse_instant(raw).ok_or_else(|| E::custom(format!("invalid instant '{raw}'")))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse::<D::Error>(&raw)
    }

    pub fn deserialize_seq<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<NaiveDateTime>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|raw| parse::<D::Error>(raw))
            .collect()
    }
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
    };
    next_month.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(start: NaiveDate, days: i64) -> i64 {
        let mut count = 0;
        for i in 0..days {
            if !is_weekend(start + Duration::days(i)) {
                count += 1;
            }
        }
        count
    }

    #[test]
    fn closed_form_count_matches_day_by_day_walk() {
        let anchors = [
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 29).unwrap(),
        ];
        for start in anchors {
            for days in 0..60 {
                assert_eq!(
                    count_weekdays_from(start, days),
                    walk(start, days),
                    "start={start} days={days}"
                );
            }
        }
    }

    #[test]
    fn last_day_handles_december() {
        let first = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(
            last_day_of_month(first),
            NaiveDate::from_ymd_opt(2024, 12, 31)
        );
    }
}
