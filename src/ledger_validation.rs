use crate::class_record::ClassRecord;
use crate::homework::HomeworkItem;
use crate::ledger::Ledger;
use crate::session::StudySession;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{entity} name must not be blank")]
    BlankName { entity: &'static str },

    #[error("duplicate {entity} id {id}")]
    DuplicateId { entity: &'static str, id: String },

    #[error("study session {id} has non-positive duration")]
    InvalidDuration { id: String },

    #[error("{0}")]
    Validation(String),
}

pub fn validate_class(class: &ClassRecord) -> Result<(), LedgerError> {
    if class.name.trim().is_empty() {
        return Err(LedgerError::BlankName { entity: "class" });
    }
    if class.id.trim().is_empty() {
        return Err(LedgerError::Validation("class id must not be blank".into()));
    }
    Ok(())
}

pub fn validate_homework(item: &HomeworkItem) -> Result<(), LedgerError> {
    if item.id.trim().is_empty() {
        return Err(LedgerError::Validation("homework id must not be blank".into()));
    }
    if item.title.trim().is_empty() {
        return Err(LedgerError::BlankName { entity: "homework" });
    }
    let mut subtask_ids = HashSet::with_capacity(item.subtasks.len());
    for subtask in &item.subtasks {
        if !subtask_ids.insert(subtask.id.as_str()) {
            return Err(LedgerError::DuplicateId {
                entity: "subtask",
                id: subtask.id.clone(),
            });
        }
    }
    Ok(())
}

pub fn validate_session(session: &StudySession) -> Result<(), LedgerError> {
    if session.duration_minutes == 0 {
        return Err(LedgerError::InvalidDuration {
            id: session.id.clone(),
        });
    }
    Ok(())
}

fn unique_ids<'a, I>(entity: &'static str, ids: I) -> Result<(), LedgerError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(LedgerError::DuplicateId {
                entity,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_homework_collection(homework: &[HomeworkItem]) -> Result<(), LedgerError> {
    unique_ids("homework", homework.iter().map(|item| item.id.as_str()))?;
    homework.iter().try_for_each(validate_homework)
}

pub fn validate_ledger(ledger: &Ledger) -> Result<(), LedgerError> {
    unique_ids("class", ledger.classes.iter().map(|class| class.id.as_str()))?;
    ledger.classes.iter().try_for_each(validate_class)?;
    validate_homework_collection(&ledger.homework)?;
    unique_ids("session", ledger.sessions.iter().map(|session| session.id.as_str()))?;
    ledger.sessions.iter().try_for_each(validate_session)
}
