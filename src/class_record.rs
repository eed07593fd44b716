use crate::rotation::DayClassification;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a class recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleType {
    /// Meets on the listed weekdays regardless of rotation.
    #[serde(rename = "everyday")]
    Everyday,
    #[serde(rename = "a-day")]
    ADay,
    #[serde(rename = "b-day")]
    BDay,
}

impl ScheduleType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleType::Everyday => "everyday",
            ScheduleType::ADay => "a-day",
            ScheduleType::BDay => "b-day",
        }
    }

    /// Whether a rotation-bound class meets on a day with this classification.
    pub fn meets_on(self, classification: DayClassification) -> bool {
        matches!(
            (self, classification),
            (ScheduleType::ADay, DayClassification::A) | (ScheduleType::BDay, DayClassification::B)
        )
    }
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "everyday" => Ok(ScheduleType::Everyday),
            "a-day" | "a" => Ok(ScheduleType::ADay),
            "b-day" | "b" => Ok(ScheduleType::BDay),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub id: String,
    pub name: String,
    pub color: String,
    pub schedule_type: ScheduleType,
    /// Only consulted for `Everyday` classes.
    #[serde(default, with = "weekday_names")]
    pub days_of_week: Vec<Weekday>,
}

impl ClassRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        color: impl Into<String>,
        schedule_type: ScheduleType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            schedule_type,
            days_of_week: Vec::new(),
        }
    }

    pub fn with_days<I: IntoIterator<Item = Weekday>>(mut self, days: I) -> Self {
        self.days_of_week = days.into_iter().collect();
        self
    }

    pub fn is_scheduled_on(&self, date: NaiveDate, classification: DayClassification) -> bool {
        match self.schedule_type {
            ScheduleType::Everyday => self.days_of_week.contains(&date.weekday()),
            rotation => rotation.meets_on(classification),
        }
    }
}

/// Weekdays as long English names ("Monday"), the stored form of class days.
mod weekday_names {
    use crate::calendar::{parse_weekday, weekday_name};
    use chrono::Weekday;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(days.iter().map(|day| weekday_name(*day)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Weekday>, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .iter()
            .map(|name| {
                parse_weekday(name).ok_or_else(|| D::Error::custom(format!("invalid weekday '{name}'")))
            })
            .collect()
    }
}
