//! Task Entity
//!
//! Tasks hang off a project and may nest under a parent task. Status is a
//! plain tag, not a state machine; the only transition bookkeeping is the
//! previous status saved when a task is completed, so reopening restores it.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::tsid::TsidGenerator;

pub const DEFAULT_PRIORITY: i32 = 3;

/// Task status tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
    Blocked,
}

/// Task entity, owner-scoped like its project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// TSID as primary key
    #[serde(rename = "_id")]
    pub id: String,

    /// Owning member
    pub member_id: String,

    pub project_id: String,

    /// Parent task for sub-tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub status: TaskStatus,

    /// Status the task had before it was completed. Present only while the
    /// task is DONE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<TaskStatus>,

    /// Comma-joined tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,

    /// 1 (highest) to 5 (lowest)
    pub priority: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time_hours: Option<f64>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        member_id: impl Into<String>,
        project_id: impl Into<String>,
        parent_id: Option<String>,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            member_id: member_id.into(),
            project_id: project_id.into(),
            parent_id,
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            previous_status: None,
            tags: None,
            priority: DEFAULT_PRIORITY,
            due_date: None,
            estimated_time_hours: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Change the status tag. Completing a task saves the status it left;
    /// any other move out of DONE discards it.
    pub fn change_status(&mut self, next: TaskStatus) {
        if next == self.status {
            return;
        }
        if next == TaskStatus::Done {
            self.previous_status = Some(self.status);
        } else if self.status == TaskStatus::Done {
            self.previous_status = None;
        }
        self.status = next;
    }

    /// Reopen a completed task, restoring the status it had before DONE
    pub fn reopen(&mut self) {
        if self.status == TaskStatus::Done {
            self.status = self.previous_status.take().unwrap_or(TaskStatus::Todo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task::new("m1", "p1", None, "Write release notes")
    }

    #[test]
    fn test_new_task_defaults() {
        let t = task();
        assert_eq!(t.status, TaskStatus::Todo);
        assert_eq!(t.priority, 3);
        assert!(t.previous_status.is_none());
    }

    #[test]
    fn test_completing_saves_previous_status() {
        let mut t = task();
        t.change_status(TaskStatus::Doing);
        t.change_status(TaskStatus::Done);
        assert_eq!(t.status, TaskStatus::Done);
        assert_eq!(t.previous_status, Some(TaskStatus::Doing));
    }

    #[test]
    fn test_reopen_restores_previous_status() {
        let mut t = task();
        t.change_status(TaskStatus::Doing);
        t.change_status(TaskStatus::Done);
        t.reopen();
        assert_eq!(t.status, TaskStatus::Doing);
        assert!(t.previous_status.is_none());
    }

    #[test]
    fn test_reopen_without_history_falls_back_to_todo() {
        let mut t = task();
        t.status = TaskStatus::Done;
        t.reopen();
        assert_eq!(t.status, TaskStatus::Todo);
    }

    #[test]
    fn test_explicit_move_out_of_done_clears_history() {
        let mut t = task();
        t.change_status(TaskStatus::Doing);
        t.change_status(TaskStatus::Done);
        t.change_status(TaskStatus::Blocked);
        assert_eq!(t.status, TaskStatus::Blocked);
        assert!(t.previous_status.is_none());
    }

    #[test]
    fn test_same_status_is_noop() {
        let mut t = task();
        t.change_status(TaskStatus::Todo);
        assert_eq!(t.status, TaskStatus::Todo);
        assert!(t.previous_status.is_none());
    }
}
