//! Task Service

use chrono::NaiveDate;
use std::sync::Arc;

use crate::project::repository::ProjectRepository;
use crate::shared::error::{PlatformError, Result};
use crate::task::entity::{Task, TaskStatus};
use crate::task::repository::TaskRepository;

pub struct TaskService {
    tasks: Arc<TaskRepository>,
    projects: Arc<ProjectRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<TaskRepository>, projects: Arc<ProjectRepository>) -> Self {
        Self { tasks, projects }
    }

    /// Create a task under an owned project, optionally nested under an
    /// owned parent task
    pub async fn create(
        &self,
        member_id: &str,
        project_id: &str,
        parent_id: Option<String>,
        title: &str,
        description: Option<String>,
        priority: Option<i32>,
    ) -> Result<Task> {
        if title.trim().is_empty() {
            return Err(PlatformError::validation("Task title is required"));
        }
        self.projects
            .find_owned(member_id, project_id)
            .await?
            .ok_or_else(|| PlatformError::ProjectNotFound {
                id: project_id.to_string(),
            })?;
        if let Some(parent_id) = &parent_id {
            self.get(member_id, parent_id).await?;
        }

        let mut task = Task::new(member_id, project_id, parent_id, title);
        task.description = description;
        if let Some(priority) = priority {
            if !(1..=5).contains(&priority) {
                return Err(PlatformError::validation("Priority must be 1..=5"));
            }
            task.priority = priority;
        }
        self.tasks.insert(&task).await?;
        Ok(task)
    }

    pub async fn list_by_project(&self, member_id: &str, project_id: &str) -> Result<Vec<Task>> {
        self.projects
            .find_owned(member_id, project_id)
            .await?
            .ok_or_else(|| PlatformError::ProjectNotFound {
                id: project_id.to_string(),
            })?;
        self.tasks.find_by_project(member_id, project_id).await
    }

    pub async fn get(&self, member_id: &str, id: &str) -> Result<Task> {
        self.tasks
            .find_owned(member_id, id)
            .await?
            .ok_or_else(|| PlatformError::TaskNotFound { id: id.to_string() })
    }

    pub async fn update(
        &self,
        member_id: &str,
        id: &str,
        title: Option<String>,
        description: Option<String>,
        priority: Option<i32>,
    ) -> Result<Task> {
        let mut task = self.get(member_id, id).await?;

        if let Some(title) = title {
            if title.trim().is_empty() {
                return Err(PlatformError::validation("Task title cannot be empty"));
            }
            task.title = title;
        }
        if let Some(description) = description {
            task.description = Some(description);
        }
        if let Some(priority) = priority {
            if !(1..=5).contains(&priority) {
                return Err(PlatformError::validation("Priority must be 1..=5"));
            }
            task.priority = priority;
        }

        self.save(task).await
    }

    pub async fn delete(&self, member_id: &str, id: &str) -> Result<()> {
        if !self.tasks.delete_owned(member_id, id).await? {
            return Err(PlatformError::TaskNotFound { id: id.to_string() });
        }
        Ok(())
    }

    /// Set the status tag. With no explicit status a completed task is
    /// reopened to the status it had before DONE.
    pub async fn update_status(
        &self,
        member_id: &str,
        id: &str,
        status: Option<TaskStatus>,
    ) -> Result<Task> {
        let mut task = self.get(member_id, id).await?;
        match status {
            Some(status) => task.change_status(status),
            None => task.reopen(),
        }
        self.save(task).await
    }

    pub async fn update_tags(&self, member_id: &str, id: &str, tags: Option<String>) -> Result<Task> {
        let mut task = self.get(member_id, id).await?;
        task.tags = tags.filter(|t| !t.trim().is_empty());
        self.save(task).await
    }

    pub async fn update_schedule(
        &self,
        member_id: &str,
        id: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<Task> {
        let mut task = self.get(member_id, id).await?;
        task.due_date = due_date;
        self.save(task).await
    }

    pub async fn update_time(
        &self,
        member_id: &str,
        id: &str,
        estimated_time_hours: Option<f64>,
    ) -> Result<Task> {
        if let Some(hours) = estimated_time_hours {
            if hours < 0.0 {
                return Err(PlatformError::validation("Estimated time cannot be negative"));
            }
        }
        let mut task = self.get(member_id, id).await?;
        task.estimated_time_hours = estimated_time_hours;
        self.save(task).await
    }

    async fn save(&self, mut task: Task) -> Result<Task> {
        task.updated_at = chrono::Utc::now();
        self.tasks.update(&task).await?;
        Ok(task)
    }
}
