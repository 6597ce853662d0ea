//! Task API Endpoints
//!
//! Owner-scoped task CRUD under /api/task, with sub-resource updates for
//! status, tags, schedule, and time. All routes require ROLE_MEMBER.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::shared::envelope::BaseResponse;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::task::entity::{Task, TaskStatus};
use crate::task::service::TaskService;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
}

/// Status update. Omitting `status` reopens a completed task to the status
/// it had before DONE.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagsRequest {
    /// Comma-joined tags; absent or empty clears them
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    /// ISO date; absent clears the due date
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimeRequest {
    /// Absent clears the estimate
    pub estimated_time_hours: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListTasksQuery {
    pub project_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time_hours: Option<f64>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            project_id: task.project_id,
            parent_id: task.parent_id,
            title: task.title,
            description: task.description,
            status: task.status,
            previous_status: task.previous_status,
            tags: task.tags,
            priority: task.priority,
            due_date: task.due_date,
            estimated_time_hours: task.estimated_time_hours,
        }
    }
}

#[derive(Clone)]
pub struct TasksState {
    pub task_service: Arc<TaskService>,
}

/// Create a task
#[utoipa::path(
    post,
    path = "",
    tag = "task",
    operation_id = "postTask",
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Task created", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Project or parent task not found")
    )
)]
pub async fn create_task(
    State(state): State<TasksState>,
    auth: Authenticated,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state
        .task_service
        .create(
            &auth.member_id,
            &req.project_id,
            req.parent_id,
            &req.title,
            req.description,
            req.priority,
        )
        .await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// List tasks in a project
#[utoipa::path(
    get,
    path = "",
    tag = "task",
    operation_id = "getTasks",
    params(ListTasksQuery),
    responses(
        (status = 200, description = "Tasks", body = BaseResponse<Vec<TaskResponse>>),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_tasks(
    State(state): State<TasksState>,
    auth: Authenticated,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<BaseResponse<Vec<TaskResponse>>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let tasks = state
        .task_service
        .list_by_project(&auth.member_id, &query.project_id)
        .await?;
    Ok(Json(BaseResponse::ok(
        tasks.into_iter().map(Into::into).collect(),
    )))
}

/// Get one task
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "task",
    operation_id = "getTask",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn get_task(
    State(state): State<TasksState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state.task_service.get(&auth.member_id, &id).await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// Update task fields
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "task",
    operation_id = "putTask",
    params(("id" = String, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn update_task(
    State(state): State<TasksState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state
        .task_service
        .update(&auth.member_id, &id, req.title, req.description, req.priority)
        .await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "task",
    operation_id = "deleteTask",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn delete_task(
    State(state): State<TasksState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<BaseResponse<()>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    state.task_service.delete(&auth.member_id, &id).await?;
    Ok(Json(BaseResponse::success("task deleted")))
}

/// Update task status
#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = "task",
    operation_id = "patchTaskStatus",
    params(("id" = String, Path, description = "Task id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn update_status(
    State(state): State<TasksState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state
        .task_service
        .update_status(&auth.member_id, &id, req.status)
        .await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// Update task tags
#[utoipa::path(
    patch,
    path = "/{id}/tags",
    tag = "task",
    operation_id = "patchTaskTags",
    params(("id" = String, Path, description = "Task id")),
    request_body = UpdateTagsRequest,
    responses(
        (status = 200, description = "Tags updated", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn update_tags(
    State(state): State<TasksState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateTagsRequest>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state
        .task_service
        .update_tags(&auth.member_id, &id, req.tags)
        .await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// Update task due date
#[utoipa::path(
    patch,
    path = "/{id}/schedule",
    tag = "task",
    operation_id = "patchTaskSchedule",
    params(("id" = String, Path, description = "Task id")),
    request_body = UpdateScheduleRequest,
    responses(
        (status = 200, description = "Schedule updated", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn update_schedule(
    State(state): State<TasksState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateScheduleRequest>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state
        .task_service
        .update_schedule(&auth.member_id, &id, req.due_date)
        .await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// Update task time estimate
#[utoipa::path(
    patch,
    path = "/{id}/time",
    tag = "task",
    operation_id = "patchTaskTime",
    params(("id" = String, Path, description = "Task id")),
    request_body = UpdateTimeRequest,
    responses(
        (status = 200, description = "Estimate updated", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn update_time(
    State(state): State<TasksState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateTimeRequest>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state
        .task_service
        .update_time(&auth.member_id, &id, req.estimated_time_hours)
        .await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// Create the task router
pub fn task_router(state: TasksState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_task, list_tasks))
        .routes(routes!(get_task, update_task, delete_task))
        .routes(routes!(update_status))
        .routes(routes!(update_tags))
        .routes(routes!(update_schedule))
        .routes(routes!(update_time))
        .with_state(state)
}
