use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project lifecycle status. Older backend versions report completed projects
/// as `DONE`/`FINISHED` and canceled ones as `CANCELLED`/`CLOSED`, so those
/// spellings are absorbed on deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    OnHold,
    #[serde(alias = "DONE", alias = "FINISHED")]
    Completed,
    #[serde(alias = "CANCELLED", alias = "CLOSED")]
    Canceled,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::InProgress
    }
}

impl ProjectStatus {
    /// Planning, in-progress and on-hold are one group for transition
    /// purposes: status changes are only allowed out of this group.
    pub fn is_in_progress_group(&self) -> bool {
        matches!(
            self,
            ProjectStatus::Planning | ProjectStatus::InProgress | ProjectStatus::OnHold
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantScore {
    pub employee_id: i64,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub business_type_id: Option<i64>,
    #[serde(default)]
    pub business_type_name: Option<String>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by_id: Option<i64>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    #[serde(default)]
    pub has_unread_update: bool,

    // Admin financial/scoring block, only populated for privileged callers.
    #[serde(default)]
    pub contract_amount: Option<f64>,
    #[serde(default)]
    pub cost_material: Option<f64>,
    #[serde(default)]
    pub cost_labor: Option<f64>,
    #[serde(default)]
    pub cost_office: Option<f64>,
    #[serde(default)]
    pub cost_progress: Option<f64>,
    #[serde(default)]
    pub cost_other: Option<f64>,
    #[serde(default)]
    pub cost_other_note: Option<String>,
    #[serde(default)]
    pub sales_cost: Option<f64>,
    #[serde(default)]
    pub project_period_days: Option<i64>,
    #[serde(default)]
    pub difficulty: Option<f64>,
    #[serde(default)]
    pub progress_step: Option<i64>,
    #[serde(default)]
    pub participant_count: Option<i64>,
    /// Derived, stored for display only.
    #[serde(default)]
    pub profit_rate: Option<f64>,

    #[serde(default)]
    pub cancel_reason: Option<String>,
    #[serde(default)]
    pub participant_scores: Option<Vec<ParticipantScore>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_status_spellings_deserialize() {
        let done: ProjectStatus = serde_json::from_str("\"DONE\"").unwrap();
        assert_eq!(done, ProjectStatus::Completed);

        let closed: ProjectStatus = serde_json::from_str("\"CLOSED\"").unwrap();
        assert_eq!(closed, ProjectStatus::Canceled);

        let on_hold: ProjectStatus = serde_json::from_str("\"ON_HOLD\"").unwrap();
        assert!(on_hold.is_in_progress_group());
    }

    #[test]
    fn project_deserializes_with_sparse_fields() {
        let project: Project =
            serde_json::from_str(r#"{"id": 3, "name": "Depot refit"}"#).unwrap();
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert!(project.contract_amount.is_none());
        assert!(!project.has_unread_update);
    }
}
