use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An append-only progress-log entry attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by_id: Option<i64>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    #[serde(default)]
    pub department_name: Option<String>,
}

impl ProjectUpdate {
    /// Timestamp of the last touch, creation or edit, whichever is later.
    pub fn last_touched_at(&self) -> DateTime<Utc> {
        match self.updated_at {
            Some(edited) if edited > self.created_at => edited,
            _ => self.created_at,
        }
    }
}
