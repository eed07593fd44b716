use crate::calendar::{date_key, parse_date_key};
use crate::rotation::{DayClassification, DayType};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Sparse per-day classification overrides keyed by `YYYY-MM-DD`.
///
/// Only forced A/B days are stored; setting `None` removes the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, DayClassification>",
    into = "BTreeMap<String, DayClassification>"
)]
pub struct OverrideMap {
    entries: BTreeMap<String, DayType>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force `date` to `kind`; `None` clears any existing override.
    pub fn set<D: Datelike>(&mut self, date: D, kind: DayClassification) {
        let key = date_key(&date);
        match kind.day_type() {
            Some(day_type) => {
                debug!(date = %key, day_type = %day_type, "override set");
                self.entries.insert(key, day_type);
            }
            None => {
                if self.entries.remove(&key).is_some() {
                    debug!(date = %key, "override cleared");
                }
            }
        }
    }

    pub fn get<D: Datelike>(&self, date: D) -> Option<DayType> {
        self.entries.get(&date_key(&date)).copied()
    }

    pub fn get_by_key(&self, key: &str) -> Option<DayType> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overrides in key order; entries whose key is not a valid date are skipped.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, DayType)> + '_ {
        self.entries
            .iter()
            .filter_map(|(key, day_type)| parse_date_key(key).map(|date| (date, *day_type)))
    }
}

impl From<BTreeMap<String, DayClassification>> for OverrideMap {
    fn from(value: BTreeMap<String, DayClassification>) -> Self {
        let entries = value
            .into_iter()
            .filter_map(|(key, kind)| kind.day_type().map(|day_type| (key, day_type)))
            .collect();
        Self { entries }
    }
}

impl From<OverrideMap> for BTreeMap<String, DayClassification> {
    fn from(value: OverrideMap) -> Self {
        value
            .entries
            .into_iter()
            .map(|(key, day_type)| (key, day_type.into()))
            .collect()
    }
}
