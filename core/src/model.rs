//! Data model (spec §3).

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

pub type EmployeeId = i64;
pub type TimeEntryId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    In,
    Out,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::In => "in",
            Action::Out => "out",
        }
    }

    pub fn flip(self) -> Action {
        match self {
            Action::In => Action::Out,
            Action::Out => Action::In,
        }
    }

    pub fn parse(s: &str) -> Option<Action> {
        match s {
            "in" => Some(Action::In),
            "out" => Some(Action::Out),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub rfid_tag: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: TimeEntryId,
    pub employee_id: EmployeeId,
    pub timestamp: DateTime<Local>,
    pub action: Action,
    pub active: bool,
}

/// Normalizes a raw tag read into the canonical uppercase-hex form
/// (spec §6). Hardware readers may emit lowercase, colon-separated, or
/// padded forms; this keeps lookups and uniqueness checks consistent.
pub fn normalize_tag(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Validates a normalized tag against spec §3's length rule.
pub fn validate_tag(tag: &str) -> crate::error::Result<()> {
    if tag.len() < 4 || tag.len() > 50 {
        return Err(crate::error::Error::InvalidInput(format!(
            "tag must be 4-50 characters after normalization, got {}",
            tag.len()
        )));
    }
    if !tag.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(crate::error::Error::InvalidInput(
            "tag must be hexadecimal".into(),
        ));
    }
    Ok(())
}

/// Validates and trims an employee name against spec §3's length rule.
pub fn validate_name(name: &str) -> crate::error::Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(crate::error::Error::InvalidInput(
            "name must not be empty".into(),
        ));
    }
    if trimmed.chars().count() > 100 {
        return Err(crate::error::Error::InvalidInput(
            "name must be at most 100 characters".into(),
        ));
    }
    Ok(trimmed.to_string())
}
