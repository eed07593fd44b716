use super::{KeyValueStore, PersistenceResult};
use crate::ledger::Ledger;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

const KEY_PREFIX: &str = "planner";
const ACTIVE_USER_KEY: &str = "planner:active-user";

/// Whose ledger is loaded. Login is only a key selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserKey {
    /// Memory-only session; nothing is read from or written to the store.
    Guest,
    User(String),
}

impl UserKey {
    /// Blank or missing identifiers select the guest session.
    pub fn from_login(identifier: Option<&str>) -> Self {
        match identifier.map(str::trim) {
            Some(id) if !id.is_empty() => UserKey::User(id.to_string()),
            _ => UserKey::Guest,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, UserKey::Guest)
    }

    pub fn as_str(&self) -> &str {
        match self {
            UserKey::Guest => "guest",
            UserKey::User(id) => id,
        }
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The independently stored pieces of a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Classes,
    Homework,
    Sessions,
    ScheduleSettings,
    ScheduleOverrides,
    Profile,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::Classes,
        RecordKind::Homework,
        RecordKind::Sessions,
        RecordKind::ScheduleSettings,
        RecordKind::ScheduleOverrides,
        RecordKind::Profile,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Classes => "classes",
            RecordKind::Homework => "homework",
            RecordKind::Sessions => "sessions",
            RecordKind::ScheduleSettings => "schedule-settings",
            RecordKind::ScheduleOverrides => "schedule-overrides",
            RecordKind::Profile => "profile",
        }
    }
}

/// Typed load/save of one user's records over a [`KeyValueStore`].
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn KeyValueStore>,
    user: UserKey,
}

impl Repository {
    pub fn new(store: Arc<dyn KeyValueStore>, user: UserKey) -> Self {
        Self { store, user }
    }

    pub fn user(&self) -> &UserKey {
        &self.user
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    pub fn persist_enabled(&self) -> bool {
        !self.user.is_guest()
    }

    pub fn record_key(&self, kind: RecordKind) -> String {
        format!("{KEY_PREFIX}:{}:{}", self.user.as_str(), kind.as_str())
    }

    /// Stored value for `kind`, or `initial` when persistence is disabled, the
    /// record is missing, or it cannot be read back.
    pub fn load_or<T: DeserializeOwned>(&self, kind: RecordKind, initial: T) -> T {
        if !self.persist_enabled() {
            return initial;
        }
        let key = self.record_key(kind);
        match self.store.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    warn!(key = %key, error = %err, "malformed record, using default");
                    initial
                }
            },
            Ok(None) => initial,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to read record, using default");
                initial
            }
        }
    }

    pub fn load_or_default<T: DeserializeOwned + Default>(&self, kind: RecordKind) -> T {
        self.load_or(kind, T::default())
    }

    /// Writes are skipped entirely for guests.
    pub fn save<T: Serialize + ?Sized>(&self, kind: RecordKind, value: &T) -> PersistenceResult<()> {
        if !self.persist_enabled() {
            return Ok(());
        }
        let key = self.record_key(kind);
        let json = serde_json::to_string(value)?;
        self.store.put(&key, &json)?;
        debug!(key = %key, bytes = json.len(), "record saved");
        Ok(())
    }

    pub fn load_ledger(&self) -> Ledger {
        if !self.persist_enabled() {
            return Ledger::guest();
        }
        Ledger {
            classes: self.load_or_default(RecordKind::Classes),
            homework: self.load_or_default(RecordKind::Homework),
            sessions: self.load_or_default(RecordKind::Sessions),
            settings: self.load_or_default(RecordKind::ScheduleSettings),
            overrides: self.load_or_default(RecordKind::ScheduleOverrides),
            profile: self.load_or_default(RecordKind::Profile),
        }
    }

    pub fn save_ledger(&self, ledger: &Ledger) -> PersistenceResult<()> {
        self.save(RecordKind::Classes, &ledger.classes)?;
        self.save(RecordKind::Homework, &ledger.homework)?;
        self.save(RecordKind::Sessions, &ledger.sessions)?;
        self.save(RecordKind::ScheduleSettings, &ledger.settings)?;
        self.save(RecordKind::ScheduleOverrides, &ledger.overrides)?;
        self.save(RecordKind::Profile, &ledger.profile)
    }

    /// Remove every record of this user from the store.
    pub fn clear(&self) -> PersistenceResult<()> {
        if !self.persist_enabled() {
            return Ok(());
        }
        for kind in RecordKind::ALL {
            self.store.remove(&self.record_key(kind))?;
        }
        Ok(())
    }
}

/// Last logged-in user, if any. Guests are never remembered.
pub fn load_active_user(store: &dyn KeyValueStore) -> Option<UserKey> {
    match store.get(ACTIVE_USER_KEY) {
        Ok(Some(raw)) => match serde_json::from_str::<Option<String>>(&raw) {
            Ok(id) => match UserKey::from_login(id.as_deref()) {
                UserKey::Guest => {
                    // stale blank or null record
                    if let Err(err) = store.remove(ACTIVE_USER_KEY) {
                        warn!(error = %err, "failed to clear blank active user record");
                    }
                    None
                }
                user => Some(user),
            },
            Err(err) => {
                warn!(error = %err, "malformed active user record");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            warn!(error = %err, "failed to read active user record");
            None
        }
    }
}

pub fn save_active_user(store: &dyn KeyValueStore, user: Option<&UserKey>) -> PersistenceResult<()> {
    match user {
        Some(UserKey::User(id)) => store.put(ACTIVE_USER_KEY, &serde_json::to_string(id)?),
        Some(UserKey::Guest) | None => store.remove(ACTIVE_USER_KEY),
    }
}
