use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::instrument;

use uplink_api::domain::{AdminInfoPayload, Project, ProjectInfoPayload, ProjectUpdate};

use crate::overrides::{MemoryOverrideStore, OverrideStore};
use crate::scoring::{compute_scores, parse_amount, round1, AdminFieldEdits};
use crate::WorkflowError;

use super::{
    validate_cancel_reason, validate_completion, validate_progress_step, validate_update_content,
    Actor, ProjectGateway, ScoreEntry,
};

/// Orchestrates the project status workflow over a [`ProjectGateway`].
///
/// Validation happens locally before anything reaches the gateway; transport
/// failures pass through verbatim and leave local state untouched. Each
/// project allows at most one state-changing request in flight, since the
/// backend has no idempotency key and a duplicate submit could double-apply
/// a transition.
pub struct ProjectWorkflow<G> {
    gateway: Arc<G>,
    overrides: Arc<dyn OverrideStore>,
    in_flight: Mutex<HashSet<i64>>,
    ack_times: Mutex<HashMap<i64, DateTime<Utc>>>,
}

impl<G: ProjectGateway> ProjectWorkflow<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_override_store(gateway, Arc::new(MemoryOverrideStore::new()))
    }

    pub fn with_override_store(gateway: Arc<G>, overrides: Arc<dyn OverrideStore>) -> Self {
        Self {
            gateway,
            overrides,
            in_flight: Mutex::new(HashSet::new()),
            ack_times: Mutex::new(HashMap::new()),
        }
    }

    fn begin(&self, project_id: i64) -> Result<InFlightGuard<'_>, WorkflowError> {
        let mut in_flight = self.in_flight.lock().unwrap();
        if !in_flight.insert(project_id) {
            return Err(WorkflowError::RequestInFlight);
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            project_id,
        })
    }

    /// Mark the project completed with a participant evaluation. The scores
    /// must pass the completion rules (see [`validate_completion`]) before
    /// any network call is made.
    #[instrument(name = "ProjectWorkflow::complete", skip_all, fields(project_id = project.id))]
    pub async fn complete(
        &self,
        actor: &Actor,
        project: &Project,
        entries: &[ScoreEntry],
    ) -> Result<Project, WorkflowError> {
        if !actor.may_change_status(project) {
            return Err(WorkflowError::NotPermitted);
        }
        if !project.status.is_in_progress_group() {
            return Err(WorkflowError::NotInProgress { action: "complete" });
        }
        let payload = validate_completion(entries)?;

        let _guard = self.begin(project.id)?;
        Ok(self.gateway.complete_project(project.id, &payload).await?)
    }

    /// Mark the project canceled. The trimmed reason is what gets persisted.
    #[instrument(name = "ProjectWorkflow::cancel", skip_all, fields(project_id = project.id))]
    pub async fn cancel(
        &self,
        actor: &Actor,
        project: &Project,
        reason: &str,
    ) -> Result<Project, WorkflowError> {
        if !actor.may_change_status(project) {
            return Err(WorkflowError::NotPermitted);
        }
        if !project.status.is_in_progress_group() {
            return Err(WorkflowError::NotInProgress { action: "cancel" });
        }
        let reason = validate_cancel_reason(reason)?;

        let _guard = self.begin(project.id)?;
        Ok(self.gateway.cancel_project(project.id, &reason).await?)
    }

    /// Return a completed or canceled project to in-progress. Destructive:
    /// the evaluation scores and cancel reason are discarded server-side, so
    /// the caller must pass an explicit confirmation.
    #[instrument(name = "ProjectWorkflow::reopen", skip_all, fields(project_id = project.id))]
    pub async fn reopen(
        &self,
        actor: &Actor,
        project: &Project,
        confirmed: bool,
    ) -> Result<Project, WorkflowError> {
        if !actor.may_change_status(project) {
            return Err(WorkflowError::NotPermitted);
        }
        if project.status.is_in_progress_group() {
            return Err(WorkflowError::NotReopenable);
        }
        if !confirmed {
            return Err(WorkflowError::ConfirmationRequired);
        }

        let _guard = self.begin(project.id)?;
        Ok(self.gateway.reopen_project(project.id).await?)
    }

    /// Administrator acknowledgement of recent progress-log entries.
    /// Idempotent; repeated calls simply move the acknowledgement timestamp
    /// forward.
    pub async fn acknowledge(
        &self,
        actor: &Actor,
        project_id: i64,
    ) -> Result<DateTime<Utc>, WorkflowError> {
        if !actor.is_admin {
            return Err(WorkflowError::AdminOnly);
        }

        self.gateway.acknowledge_updates(project_id).await?;
        let now = Utc::now();
        self.ack_times.lock().unwrap().insert(project_id, now);
        Ok(now)
    }

    /// Timestamp of the latest acknowledgement recorded this session, used
    /// to silence "unread update" highlighting.
    pub fn acknowledged_at(&self, project_id: i64) -> Option<DateTime<Utc>> {
        self.ack_times.lock().unwrap().get(&project_id).copied()
    }

    pub async fn append_update(
        &self,
        project_id: i64,
        content: &str,
    ) -> Result<ProjectUpdate, WorkflowError> {
        let content = validate_update_content(content)?;
        let _guard = self.begin(project_id)?;
        Ok(self.gateway.append_update(project_id, &content).await?)
    }

    pub async fn edit_update(
        &self,
        actor: &Actor,
        project: &Project,
        update_id: i64,
        content: &str,
    ) -> Result<ProjectUpdate, WorkflowError> {
        if !actor.may_edit_updates(project) {
            return Err(WorkflowError::NotPermitted);
        }
        let content = validate_update_content(content)?;
        let _guard = self.begin(project.id)?;
        Ok(self
            .gateway
            .edit_update(project.id, update_id, &content)
            .await?)
    }

    pub async fn delete_update(
        &self,
        actor: &Actor,
        project: &Project,
        update_id: i64,
    ) -> Result<(), WorkflowError> {
        if !actor.may_edit_updates(project) {
            return Err(WorkflowError::NotPermitted);
        }
        let _guard = self.begin(project.id)?;
        Ok(self.gateway.delete_update(project.id, update_id).await?)
    }

    /// Save the admin financial/score block. Each field resolves through the
    /// same chain as the calculator (edit, override, record), the profit
    /// rate and participant count are filled in from the computed breakdown,
    /// and the sent snapshot is stored locally once the backend accepts it.
    #[instrument(name = "ProjectWorkflow::save_admin_info", skip_all, fields(project_id = project.id))]
    pub async fn save_admin_info(
        &self,
        actor: &Actor,
        project: &Project,
        edits: &AdminFieldEdits,
    ) -> Result<Project, WorkflowError> {
        if !actor.is_admin {
            return Err(WorkflowError::AdminOnly);
        }

        let stored = self.overrides.load(project.id);
        let breakdown = compute_scores(project, edits, stored.as_ref());

        // The edit form is initialized from the loaded record, so a present
        // edit is the whole truth for that field: an emptied box clears it
        // server-side. Only an untouched field falls back to the layered read.
        let resolve = |edit: Option<&String>, ov: Option<f64>, record: Option<f64>| match edit {
            Some(text) => parse_amount(text),
            None => ov.or(record),
        };
        let ov = |f: fn(&AdminInfoPayload) -> Option<f64>| stored.as_ref().and_then(f);

        let progress_step = validate_progress_step(resolve(
            edits.progress_step.as_ref(),
            ov(|o| o.progress_step.map(|v| v as f64)),
            project.progress_step.map(|v| v as f64),
        ))?;

        let payload = AdminInfoPayload {
            contract_amount: resolve(
                edits.contract_amount.as_ref(),
                ov(|o| o.contract_amount),
                project.contract_amount,
            ),
            project_period_days: resolve(
                edits.project_period_days.as_ref(),
                ov(|o| o.project_period_days.map(|v| v as f64)),
                project.project_period_days.map(|v| v as f64),
            )
            .map(|v| v.round() as i64),
            difficulty: resolve(
                edits.difficulty.as_ref(),
                ov(|o| o.difficulty),
                project.difficulty,
            ),
            progress_step,
            participant_count: Some(breakdown.participant_penalty.round() as i64),
            profit_rate: Some(round1(breakdown.profit_rate_score)),
            cost_material: resolve(
                edits.cost_material.as_ref(),
                ov(|o| o.cost_material),
                project.cost_material,
            ),
            cost_labor: resolve(
                edits.cost_labor.as_ref(),
                ov(|o| o.cost_labor),
                project.cost_labor,
            ),
            cost_office: resolve(
                edits.cost_office.as_ref(),
                ov(|o| o.cost_office),
                project.cost_office,
            ),
            cost_progress: resolve(
                edits.cost_progress.as_ref(),
                ov(|o| o.cost_progress),
                project.cost_progress,
            ),
            cost_other: resolve(
                edits.cost_other.as_ref(),
                ov(|o| o.cost_other),
                project.cost_other,
            ),
            sales_cost: resolve(
                edits.sales_cost.as_ref(),
                ov(|o| o.sales_cost),
                project.sales_cost,
            ),
            cost_other_note: match &edits.cost_other_note {
                Some(text) => {
                    let trimmed = text.trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                }
                None => stored
                    .as_ref()
                    .and_then(|o| o.cost_other_note.clone())
                    .or_else(|| project.cost_other_note.clone()),
            },
        };

        let _guard = self.begin(project.id)?;
        let updated = self.gateway.save_admin_info(project.id, &payload).await?;
        self.overrides.store(project.id, &payload);
        Ok(updated)
    }

    /// Save the general project info (name, references, memo).
    pub async fn save_project_info(
        &self,
        actor: &Actor,
        project: &Project,
        payload: &ProjectInfoPayload,
    ) -> Result<Project, WorkflowError> {
        if !actor.may_change_status(project) {
            return Err(WorkflowError::NotPermitted);
        }
        if payload.name.trim().is_empty() {
            return Err(WorkflowError::EmptyProjectName);
        }

        let _guard = self.begin(project.id)?;
        Ok(self.gateway.save_project_info(project.id, payload).await?)
    }
}

/// Releases the per-project in-flight slot when the operation finishes,
/// successfully or not.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<i64>>,
    project_id: i64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().unwrap().remove(&self.project_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::MockGateway;
    use uplink_api::{domain::ProjectStatus, ApiError};

    fn in_progress_project() -> Project {
        Project {
            id: 1,
            name: "Bridge inspection".to_string(),
            created_by_id: Some(10),
            status: ProjectStatus::InProgress,
            ..Project::default()
        }
    }

    fn creator() -> Actor {
        Actor {
            user_id: 10,
            is_admin: false,
        }
    }

    fn admin() -> Actor {
        Actor {
            user_id: 99,
            is_admin: true,
        }
    }

    fn workflow(project: Project) -> (Arc<MockGateway>, ProjectWorkflow<MockGateway>) {
        let gateway = Arc::new(MockGateway::new(project));
        let workflow = ProjectWorkflow::new(Arc::clone(&gateway));
        (gateway, workflow)
    }

    #[tokio::test]
    async fn complete_transitions_and_stores_rounded_scores() {
        let (gateway, workflow) = workflow(in_progress_project());
        let entries = [
            ScoreEntry::new(1, "3.5"),
            ScoreEntry::new(2, "3.5"),
            ScoreEntry::new(3, "3.0"),
        ];

        let updated = workflow
            .complete(&creator(), &in_progress_project(), &entries)
            .await
            .unwrap();

        assert_eq!(updated.status, ProjectStatus::Completed);
        let scores = gateway.project().participant_scores.unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0].score, Some(3.5));
    }

    #[tokio::test]
    async fn complete_rejects_sum_mismatch_without_mutating() {
        let (gateway, workflow) = workflow(in_progress_project());
        let entries = [ScoreEntry::new(1, "3.5"), ScoreEntry::new(2, "3.6")];

        let err = workflow
            .complete(&creator(), &in_progress_project(), &entries)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::ScoreSumMismatch { sum } if sum == 7.1));
        assert_eq!(gateway.project().status, ProjectStatus::InProgress);
    }

    #[tokio::test]
    async fn complete_requires_creator_or_admin() {
        let (_, workflow) = workflow(in_progress_project());
        let stranger = Actor {
            user_id: 42,
            is_admin: false,
        };
        let entries = [ScoreEntry::new(1, "10.0")];

        let err = workflow
            .complete(&stranger, &in_progress_project(), &entries)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotPermitted));
    }

    #[tokio::test]
    async fn complete_is_only_valid_from_the_in_progress_group() {
        let mut completed = in_progress_project();
        completed.status = ProjectStatus::Completed;
        let (_, workflow) = workflow(completed.clone());

        let err = workflow
            .complete(&creator(), &completed, &[ScoreEntry::new(1, "10.0")])
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotInProgress { .. }));
    }

    #[tokio::test]
    async fn cancel_persists_the_trimmed_reason() {
        let (gateway, workflow) = workflow(in_progress_project());

        let updated = workflow
            .cancel(&creator(), &in_progress_project(), "  client pulled out  ")
            .await
            .unwrap();

        assert_eq!(updated.status, ProjectStatus::Canceled);
        assert_eq!(
            gateway.project().cancel_reason.as_deref(),
            Some("client pulled out")
        );
    }

    #[tokio::test]
    async fn cancel_rejects_blank_reason() {
        let (gateway, workflow) = workflow(in_progress_project());

        let err = workflow
            .cancel(&creator(), &in_progress_project(), "   ")
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::EmptyCancelReason));
        assert_eq!(gateway.project().status, ProjectStatus::InProgress);
    }

    #[tokio::test]
    async fn reopen_clears_evaluation_and_cancellation() {
        let mut canceled = in_progress_project();
        canceled.status = ProjectStatus::Canceled;
        canceled.cancel_reason = Some("scope change".to_string());
        let (gateway, workflow) = workflow(canceled.clone());

        let updated = workflow.reopen(&creator(), &canceled, true).await.unwrap();

        assert_eq!(updated.status, ProjectStatus::InProgress);
        assert!(gateway.project().cancel_reason.is_none());
        assert!(gateway.project().participant_scores.is_none());
    }

    #[tokio::test]
    async fn reopen_requires_confirmation_and_a_closed_state() {
        let mut completed = in_progress_project();
        completed.status = ProjectStatus::Completed;
        let (_, workflow) = workflow(completed.clone());

        let err = workflow
            .reopen(&creator(), &completed, false)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::ConfirmationRequired));

        let open = in_progress_project();
        let err = workflow.reopen(&creator(), &open, true).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotReopenable));
    }

    #[tokio::test]
    async fn acknowledge_is_admin_only_and_idempotent() {
        let (gateway, workflow) = workflow(in_progress_project());

        let err = workflow.acknowledge(&creator(), 1).await.unwrap_err();
        assert!(matches!(err, WorkflowError::AdminOnly));

        let first = workflow.acknowledge(&admin(), 1).await.unwrap();
        let second = workflow.acknowledge(&admin(), 1).await.unwrap();

        assert!(second >= first);
        assert_eq!(workflow.acknowledged_at(1), Some(second));
        assert_eq!(gateway.ack_calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn transport_errors_surface_verbatim_and_release_the_guard() {
        let (gateway, workflow) = workflow(in_progress_project());
        gateway.fail_next(ApiError::Server("database is on fire".to_string()));

        let entries = [ScoreEntry::new(1, "10.0")];
        let err = workflow
            .complete(&creator(), &in_progress_project(), &entries)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Api(ApiError::Server(ref msg)) if msg == "database is on fire"
        ));
        assert_eq!(gateway.project().status, ProjectStatus::InProgress);

        // one attempt per user action, but a new action may try again
        let updated = workflow
            .complete(&creator(), &in_progress_project(), &entries)
            .await
            .unwrap();
        assert_eq!(updated.status, ProjectStatus::Completed);
    }

    #[tokio::test]
    async fn in_flight_guard_is_per_project() {
        let (_, workflow) = workflow(in_progress_project());

        let guard = workflow.begin(1).unwrap();
        assert!(matches!(
            workflow.begin(1),
            Err(WorkflowError::RequestInFlight)
        ));
        assert!(workflow.begin(2).is_ok());

        drop(guard);
        assert!(workflow.begin(1).is_ok());
    }

    #[tokio::test]
    async fn update_content_is_validated_and_trimmed() {
        let (gateway, workflow) = workflow(in_progress_project());

        let err = workflow.append_update(1, "   ").await.unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyUpdateContent));

        let update = workflow.append_update(1, "  site visit done  ").await.unwrap();
        assert_eq!(update.content, "site visit done");

        let edited = workflow
            .edit_update(&creator(), &in_progress_project(), update.id, "revised")
            .await
            .unwrap();
        assert_eq!(edited.content, "revised");

        workflow
            .delete_update(&creator(), &in_progress_project(), update.id)
            .await
            .unwrap();
        assert!(gateway.updates().is_empty());
    }

    #[tokio::test]
    async fn edit_update_requires_creator_or_admin() {
        let (_, workflow) = workflow(in_progress_project());
        let stranger = Actor {
            user_id: 7,
            is_admin: false,
        };

        let err = workflow
            .edit_update(&stranger, &in_progress_project(), 1, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotPermitted));
    }

    #[tokio::test]
    async fn save_admin_info_resolves_fields_and_stores_override() {
        let mut project = in_progress_project();
        project.cost_material = Some(5_000_000.0);
        let (gateway, workflow) = workflow(project.clone());

        let edits = AdminFieldEdits {
            contract_amount: Some("100,000,000".to_string()),
            cost_labor: Some("35,000,000".to_string()),
            progress_step: Some("8".to_string()),
            ..AdminFieldEdits::default()
        };

        let updated = workflow
            .save_admin_info(&admin(), &project, &edits)
            .await
            .unwrap();

        assert_eq!(updated.contract_amount, Some(100_000_000.0));
        assert_eq!(updated.cost_material, Some(5_000_000.0)); // record survives
        // (100M - 40M) / 1M
        assert_eq!(updated.profit_rate, Some(60.0));
        assert_eq!(gateway.project().progress_step, Some(8));

        // the accepted snapshot now backs the layered read
        let wf_overrides = workflow.overrides.load(project.id).unwrap();
        assert_eq!(wf_overrides.contract_amount, Some(100_000_000.0));
    }

    #[tokio::test]
    async fn save_admin_info_clears_explicitly_emptied_fields() {
        let mut project = in_progress_project();
        project.contract_amount = Some(5_000_000.0);
        project.cost_labor = Some(1_000_000.0);
        project.cost_other_note = Some("site survey".to_string());
        let (gateway, workflow) = workflow(project.clone());

        let edits = AdminFieldEdits {
            contract_amount: Some(String::new()),
            cost_other_note: Some("  ".to_string()),
            ..AdminFieldEdits::default()
        };

        workflow
            .save_admin_info(&admin(), &project, &edits)
            .await
            .unwrap();

        // emptied form fields clear server-side; untouched ones survive
        assert_eq!(gateway.project().contract_amount, None);
        assert_eq!(gateway.project().cost_other_note, None);
        assert_eq!(gateway.project().cost_labor, Some(1_000_000.0));
    }

    #[tokio::test]
    async fn save_admin_info_rejects_fractional_progress_step() {
        let project = in_progress_project();
        let (gateway, workflow) = workflow(project.clone());

        let edits = AdminFieldEdits {
            progress_step: Some("8.4".to_string()),
            ..AdminFieldEdits::default()
        };
        let err = workflow
            .save_admin_info(&admin(), &project, &edits)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::ProgressStepOutOfRange));
        assert_eq!(gateway.project().progress_step, None);
    }

    #[tokio::test]
    async fn save_admin_info_validates_progress_step_and_role() {
        let project = in_progress_project();
        let (_, workflow) = workflow(project.clone());

        let err = workflow
            .save_admin_info(&creator(), &project, &AdminFieldEdits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::AdminOnly));

        let edits = AdminFieldEdits {
            progress_step: Some("11".to_string()),
            ..AdminFieldEdits::default()
        };
        let err = workflow
            .save_admin_info(&admin(), &project, &edits)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::ProgressStepOutOfRange));
    }

    #[tokio::test]
    async fn save_project_info_requires_a_name() {
        let project = in_progress_project();
        let (_, workflow) = workflow(project.clone());

        let payload = ProjectInfoPayload {
            name: "  ".to_string(),
            ..ProjectInfoPayload::default()
        };
        let err = workflow
            .save_project_info(&creator(), &project, &payload)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyProjectName));
    }
}
