use uplink_api::domain::Project;

/// The authenticated user on whose behalf the workflow acts. The backend
/// checks permissions again server-side; these guards keep obviously
/// unauthorized requests local.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: i64,
    pub is_admin: bool,
}

impl Actor {
    pub fn is_creator_of(&self, project: &Project) -> bool {
        project.created_by_id == Some(self.user_id)
    }

    /// Status transitions and project-info edits: creator or administrator.
    pub fn may_change_status(&self, project: &Project) -> bool {
        self.is_admin || self.is_creator_of(project)
    }

    /// Progress-log edit/delete follows the same policy.
    pub fn may_edit_updates(&self, project: &Project) -> bool {
        self.may_change_status(project)
    }
}
