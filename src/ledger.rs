use crate::class_record::ClassRecord;
use crate::homework::HomeworkItem;
use crate::overrides::OverrideMap;
use crate::profile::UserProfile;
use crate::rotation::ScheduleSettings;
use crate::session::StudySession;
use serde::{Deserialize, Serialize};

/// Everything hydrated for one user. The `Planner` owns exactly one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
    #[serde(default)]
    pub homework: Vec<HomeworkItem>,
    #[serde(default)]
    pub sessions: Vec<StudySession>,
    #[serde(default)]
    pub settings: Option<ScheduleSettings>,
    #[serde(default)]
    pub overrides: OverrideMap,
    #[serde(default)]
    pub profile: UserProfile,
}

impl Ledger {
    pub fn guest() -> Self {
        Self {
            profile: UserProfile::guest(),
            ..Self::default()
        }
    }

    pub fn find_class(&self, id: &str) -> Option<&ClassRecord> {
        self.classes.iter().find(|class| class.id == id)
    }

    pub fn find_homework(&self, id: &str) -> Option<&HomeworkItem> {
        self.homework.iter().find(|item| item.id == id)
    }

    /// Class a homework item belongs to, or `None` when the reference dangles.
    pub fn class_for(&self, item: &HomeworkItem) -> Option<&ClassRecord> {
        self.find_class(&item.class_id)
    }
}
