//! Project Service

use std::sync::Arc;

use crate::project::entity::{Project, ProjectStatus};
use crate::project::repository::ProjectRepository;
use crate::shared::error::{PlatformError, Result};
use crate::task::repository::TaskRepository;

pub struct ProjectService {
    projects: Arc<ProjectRepository>,
    tasks: Arc<TaskRepository>,
}

impl ProjectService {
    pub fn new(projects: Arc<ProjectRepository>, tasks: Arc<TaskRepository>) -> Self {
        Self { projects, tasks }
    }

    pub async fn create(
        &self,
        member_id: &str,
        name: &str,
        description: Option<String>,
    ) -> Result<Project> {
        if name.trim().is_empty() {
            return Err(PlatformError::validation("Project name is required"));
        }
        let project = Project::new(member_id, name, description);
        self.projects.insert(&project).await?;
        Ok(project)
    }

    pub async fn list(&self, member_id: &str) -> Result<Vec<Project>> {
        self.projects.find_all_owned(member_id).await
    }

    pub async fn get(&self, member_id: &str, id: &str) -> Result<Project> {
        self.projects
            .find_owned(member_id, id)
            .await?
            .ok_or_else(|| PlatformError::ProjectNotFound { id: id.to_string() })
    }

    pub async fn update(
        &self,
        member_id: &str,
        id: &str,
        name: Option<String>,
        description: Option<String>,
        status: Option<ProjectStatus>,
    ) -> Result<Project> {
        let mut project = self.get(member_id, id).await?;

        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(PlatformError::validation("Project name cannot be empty"));
            }
            project.name = name;
        }
        if let Some(description) = description {
            project.description = Some(description);
        }
        if let Some(status) = status {
            project.status = status;
        }
        project.updated_at = chrono::Utc::now();

        self.projects.update(&project).await?;
        Ok(project)
    }

    /// Delete a project and everything under it
    pub async fn delete(&self, member_id: &str, id: &str) -> Result<()> {
        if !self.projects.delete_owned(member_id, id).await? {
            return Err(PlatformError::ProjectNotFound { id: id.to_string() });
        }
        self.tasks.delete_by_project(member_id, id).await?;
        Ok(())
    }
}
