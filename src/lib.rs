pub mod aggregate;
pub mod calendar;
pub mod class_record;
pub mod config;
pub mod homework;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod ledger;
pub(crate) mod ledger_validation;
pub mod overrides;
pub mod persistence;
pub mod planner;
pub mod profile;
pub mod progress;
pub mod rotation;
pub mod session;

pub use class_record::{ClassRecord, ScheduleType};
pub use config::{ConfigError, PlannerConfig, StoreBackend};
pub use homework::{HomeworkItem, Subtask};
pub use ledger::Ledger;
pub use ledger_validation::LedgerError;
pub use overrides::OverrideMap;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    JsonDirStore, KeyValueStore, MemoryStore, PersistenceError, Repository, UserKey,
    load_homework_from_csv, load_ledger_from_json, save_homework_to_csv, save_ledger_to_json,
};
pub use planner::{CalendarCell, Planner};
pub use profile::UserProfile;
pub use progress::{ProgressSummary, StudyTime};
pub use rotation::{DayClassification, DayType, ScheduleSettings, classify};
pub use session::StudySession;
