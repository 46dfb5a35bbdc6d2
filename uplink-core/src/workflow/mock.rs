//! Mock gateway backed by in-memory state, for exercising the workflow
//! without a backend.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Mutex,
};

use async_trait::async_trait;
use chrono::Utc;

use uplink_api::{
    domain::{
        AdminInfoPayload, CompleteProjectPayload, ParticipantScore, Project, ProjectInfoPayload,
        ProjectStatus, ProjectUpdate,
    },
    ApiError,
};

use super::ProjectGateway;

/// In-memory stand-in for the backend. Mutations behave the way the real
/// server does: complete stores the scores, cancel stores the reason, reopen
/// clears both. A one-shot error can be injected to simulate transport
/// failures.
#[derive(Default)]
pub struct MockGateway {
    project: Mutex<Project>,
    updates: Mutex<Vec<ProjectUpdate>>,
    next_update_id: AtomicI64,
    fail_next: Mutex<Option<ApiError>>,
    pub ack_calls: AtomicI64,
}

impl MockGateway {
    pub fn new(project: Project) -> Self {
        Self {
            project: Mutex::new(project),
            next_update_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    /// Inject an error for the next gateway call only.
    pub fn fail_next(&self, error: ApiError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    pub fn project(&self) -> Project {
        self.project.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<ProjectUpdate> {
        self.updates.lock().unwrap().clone()
    }

    fn take_failure(&self) -> Result<(), ApiError> {
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn push_update(&self, content: &str) -> ProjectUpdate {
        let update = ProjectUpdate {
            id: self.next_update_id.fetch_add(1, Ordering::SeqCst),
            content: content.to_string(),
            created_at: Utc::now(),
            updated_at: None,
            created_by_id: None,
            created_by_name: None,
            department_name: None,
        };
        self.updates.lock().unwrap().push(update.clone());
        update
    }
}

#[async_trait]
impl ProjectGateway for MockGateway {
    async fn fetch_project(&self, _project_id: i64) -> Result<Project, ApiError> {
        self.take_failure()?;
        Ok(self.project())
    }

    async fn fetch_project_updates(
        &self,
        _project_id: i64,
    ) -> Result<Vec<ProjectUpdate>, ApiError> {
        self.take_failure()?;
        Ok(self.updates())
    }

    async fn append_update(
        &self,
        _project_id: i64,
        content: &str,
    ) -> Result<ProjectUpdate, ApiError> {
        self.take_failure()?;
        Ok(self.push_update(content))
    }

    async fn edit_update(
        &self,
        _project_id: i64,
        update_id: i64,
        content: &str,
    ) -> Result<ProjectUpdate, ApiError> {
        self.take_failure()?;
        let mut updates = self.updates.lock().unwrap();
        let update = updates
            .iter_mut()
            .find(|u| u.id == update_id)
            .ok_or(ApiError::NotFound)?;
        update.content = content.to_string();
        update.updated_at = Some(Utc::now());
        Ok(update.clone())
    }

    async fn delete_update(&self, _project_id: i64, update_id: i64) -> Result<(), ApiError> {
        self.take_failure()?;
        let mut updates = self.updates.lock().unwrap();
        let before = updates.len();
        updates.retain(|u| u.id != update_id);
        if updates.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn complete_project(
        &self,
        _project_id: i64,
        payload: &CompleteProjectPayload,
    ) -> Result<Project, ApiError> {
        self.take_failure()?;
        let mut project = self.project.lock().unwrap();
        project.status = ProjectStatus::Completed;
        project.participant_scores = Some(
            payload
                .participants
                .iter()
                .map(|p| ParticipantScore {
                    employee_id: p.employee_id,
                    employee_name: None,
                    score: Some(p.score),
                })
                .collect(),
        );
        Ok(project.clone())
    }

    async fn cancel_project(&self, _project_id: i64, reason: &str) -> Result<Project, ApiError> {
        self.take_failure()?;
        let mut project = self.project.lock().unwrap();
        project.status = ProjectStatus::Canceled;
        project.cancel_reason = Some(reason.to_string());
        Ok(project.clone())
    }

    async fn reopen_project(&self, _project_id: i64) -> Result<Project, ApiError> {
        self.take_failure()?;
        let mut project = self.project.lock().unwrap();
        project.status = ProjectStatus::InProgress;
        project.participant_scores = None;
        project.cancel_reason = None;
        Ok(project.clone())
    }

    async fn save_admin_info(
        &self,
        _project_id: i64,
        payload: &AdminInfoPayload,
    ) -> Result<Project, ApiError> {
        self.take_failure()?;
        let mut project = self.project.lock().unwrap();
        project.contract_amount = payload.contract_amount;
        project.project_period_days = payload.project_period_days;
        project.difficulty = payload.difficulty;
        project.progress_step = payload.progress_step;
        project.participant_count = payload.participant_count;
        project.profit_rate = payload.profit_rate;
        project.cost_material = payload.cost_material;
        project.cost_labor = payload.cost_labor;
        project.cost_office = payload.cost_office;
        project.cost_progress = payload.cost_progress;
        project.cost_other = payload.cost_other;
        project.sales_cost = payload.sales_cost;
        project.cost_other_note = payload.cost_other_note.clone();
        Ok(project.clone())
    }

    async fn save_project_info(
        &self,
        _project_id: i64,
        payload: &ProjectInfoPayload,
    ) -> Result<Project, ApiError> {
        self.take_failure()?;
        let mut project = self.project.lock().unwrap();
        project.name = payload.name.clone();
        project.business_type_id = payload.business_type_id;
        project.memo = payload.memo.clone();
        if payload.client_id.is_some() {
            project.client_id = payload.client_id;
        }
        if payload.created_by_id.is_some() {
            project.created_by_id = payload.created_by_id;
        }
        Ok(project.clone())
    }

    async fn acknowledge_updates(&self, _project_id: i64) -> Result<(), ApiError> {
        self.take_failure()?;
        self.ack_calls.fetch_add(1, Ordering::SeqCst);
        let mut project = self.project.lock().unwrap();
        project.has_unread_update = false;
        Ok(())
    }
}
