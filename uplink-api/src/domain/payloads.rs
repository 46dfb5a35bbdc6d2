use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantScoreInput {
    pub employee_id: i64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteProjectPayload {
    pub participants: Vec<ParticipantScoreInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelProjectPayload {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateContentPayload {
    pub content: String,
}

/// Admin financial/score fields. Absent fields are serialized as null so the
/// backend clears them rather than leaving stale values behind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminInfoPayload {
    pub contract_amount: Option<f64>,
    pub project_period_days: Option<i64>,
    pub difficulty: Option<f64>,
    pub progress_step: Option<i64>,
    pub participant_count: Option<i64>,
    pub profit_rate: Option<f64>,
    pub cost_material: Option<f64>,
    pub cost_labor: Option<f64>,
    pub cost_office: Option<f64>,
    pub cost_progress: Option<f64>,
    pub cost_other: Option<f64>,
    pub sales_cost: Option<f64>,
    pub cost_other_note: Option<String>,
}

/// General project-info save. Optional reassignments are omitted entirely
/// when unset so the backend does not null them out.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectInfoPayload {
    pub name: String,
    pub business_type_id: Option<i64>,
    pub memo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<i64>,
}
