use crate::calendar::{self, count_weekdays_from, is_weekend};
use crate::overrides::OverrideMap;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One phase of the A/B rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    A,
    B,
}

impl DayType {
    pub fn other(self) -> Self {
        match self {
            DayType::A => DayType::B,
            DayType::B => DayType::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayType::A => "a",
            DayType::B => "b",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(DayType::A),
            "b" => Ok(DayType::B),
            _ => Err(()),
        }
    }
}

/// Result of classifying a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayClassification {
    A,
    B,
    None,
}

impl DayClassification {
    pub fn day_type(self) -> Option<DayType> {
        match self {
            DayClassification::A => Some(DayType::A),
            DayClassification::B => Some(DayType::B),
            DayClassification::None => None,
        }
    }

    pub fn is_school_day(self) -> bool {
        self != DayClassification::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayClassification::A => "a",
            DayClassification::B => "b",
            DayClassification::None => "none",
        }
    }
}

impl From<DayType> for DayClassification {
    fn from(value: DayType) -> Self {
        match value {
            DayType::A => DayClassification::A,
            DayType::B => DayClassification::B,
        }
    }
}

impl fmt::Display for DayClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayClassification {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(DayClassification::None),
            other => DayType::from_str(other).map(DayClassification::from),
        }
    }
}

/// Rotation anchor configured by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSettings {
    pub start_date: NaiveDate,
    pub start_day_type: DayType,
    #[serde(alias = "weekends")]
    pub include_weekends: bool,
}

impl ScheduleSettings {
    pub fn new(start_date: NaiveDate, start_day_type: DayType, include_weekends: bool) -> Self {
        Self {
            start_date,
            start_day_type,
            include_weekends,
        }
    }

    /// Rotation steps between the anchor and `date` (`date >= start_date`).
    ///
    /// With weekends skipped this counts weekdays among the days from the
    /// anchor inclusive up to `date` exclusive, so the anchor itself is step 0
    /// and a weekend between two weekdays never advances the rotation.
    pub fn day_count(&self, date: NaiveDate) -> i64 {
        let diff_days = (date - self.start_date).num_days();
        if diff_days <= 0 {
            return 0;
        }
        if self.include_weekends {
            diff_days
        } else {
            count_weekdays_from(self.start_date, diff_days)
        }
    }

    /// Rotation value of `date` ignoring overrides.
    pub fn computed(&self, date: NaiveDate) -> DayClassification {
        if date < self.start_date {
            return DayClassification::None;
        }
        if !self.include_weekends && is_weekend(date) {
            return DayClassification::None;
        }
        let day_type = if self.day_count(date) % 2 == 0 {
            self.start_day_type
        } else {
            self.start_day_type.other()
        };
        day_type.into()
    }
}

/// Classify a calendar day.
///
/// Overrides win over everything, including a weekend excluded from the
/// rotation; without settings every day is `None`.
pub fn classify(
    date: NaiveDate,
    settings: Option<&ScheduleSettings>,
    overrides: &OverrideMap,
) -> DayClassification {
    let Some(settings) = settings else {
        return DayClassification::None;
    };
    if let Some(forced) = overrides.get(date) {
        return forced.into();
    }
    settings.computed(date)
}

pub fn classify_instant(
    instant: NaiveDateTime,
    settings: Option<&ScheduleSettings>,
    overrides: &OverrideMap,
) -> DayClassification {
    classify(calendar::truncate_to_midnight(instant).date(), settings, overrides)
}
