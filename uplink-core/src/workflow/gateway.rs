use async_trait::async_trait;

use uplink_api::{
    domain::{AdminInfoPayload, CompleteProjectPayload, Project, ProjectInfoPayload, ProjectUpdate},
    ApiError, UplinkClient,
};

/// Outbound port for project persistence. The backend is the source of
/// truth for every mutation; implementations do a single attempt with no
/// retry or backoff.
#[async_trait]
pub trait ProjectGateway: Send + Sync + 'static {
    async fn fetch_project(&self, project_id: i64) -> Result<Project, ApiError>;

    async fn fetch_project_updates(&self, project_id: i64)
        -> Result<Vec<ProjectUpdate>, ApiError>;

    async fn append_update(&self, project_id: i64, content: &str)
        -> Result<ProjectUpdate, ApiError>;

    async fn edit_update(
        &self,
        project_id: i64,
        update_id: i64,
        content: &str,
    ) -> Result<ProjectUpdate, ApiError>;

    async fn delete_update(&self, project_id: i64, update_id: i64) -> Result<(), ApiError>;

    async fn complete_project(
        &self,
        project_id: i64,
        payload: &CompleteProjectPayload,
    ) -> Result<Project, ApiError>;

    async fn cancel_project(&self, project_id: i64, reason: &str) -> Result<Project, ApiError>;

    /// Clears evaluation and cancellation data server-side.
    async fn reopen_project(&self, project_id: i64) -> Result<Project, ApiError>;

    async fn save_admin_info(
        &self,
        project_id: i64,
        payload: &AdminInfoPayload,
    ) -> Result<Project, ApiError>;

    async fn save_project_info(
        &self,
        project_id: i64,
        payload: &ProjectInfoPayload,
    ) -> Result<Project, ApiError>;

    async fn acknowledge_updates(&self, project_id: i64) -> Result<(), ApiError>;
}

#[async_trait]
impl ProjectGateway for UplinkClient {
    async fn fetch_project(&self, project_id: i64) -> Result<Project, ApiError> {
        self.fetch_project(project_id).await
    }

    async fn fetch_project_updates(
        &self,
        project_id: i64,
    ) -> Result<Vec<ProjectUpdate>, ApiError> {
        self.fetch_project_updates(project_id).await
    }

    async fn append_update(
        &self,
        project_id: i64,
        content: &str,
    ) -> Result<ProjectUpdate, ApiError> {
        self.append_update(project_id, content).await
    }

    async fn edit_update(
        &self,
        project_id: i64,
        update_id: i64,
        content: &str,
    ) -> Result<ProjectUpdate, ApiError> {
        self.edit_update(project_id, update_id, content).await
    }

    async fn delete_update(&self, project_id: i64, update_id: i64) -> Result<(), ApiError> {
        self.delete_update(project_id, update_id).await
    }

    async fn complete_project(
        &self,
        project_id: i64,
        payload: &CompleteProjectPayload,
    ) -> Result<Project, ApiError> {
        self.complete_project(project_id, payload).await
    }

    async fn cancel_project(&self, project_id: i64, reason: &str) -> Result<Project, ApiError> {
        self.cancel_project(project_id, reason).await
    }

    async fn reopen_project(&self, project_id: i64) -> Result<Project, ApiError> {
        self.reopen_project(project_id).await
    }

    async fn save_admin_info(
        &self,
        project_id: i64,
        payload: &AdminInfoPayload,
    ) -> Result<Project, ApiError> {
        self.save_admin_info(project_id, payload).await
    }

    async fn save_project_info(
        &self,
        project_id: i64,
        payload: &ProjectInfoPayload,
    ) -> Result<Project, ApiError> {
        self.save_project_info(project_id, payload).await
    }

    async fn acknowledge_updates(&self, project_id: i64) -> Result<(), ApiError> {
        self.acknowledge_updates(project_id).await
    }
}
