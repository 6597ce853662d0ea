//! Agent API Endpoints
//!
//! Mirror of the project/task operations under /api/agent with tool-style
//! names and POST-only invocation, shaped for LLM tool calling. Every
//! argument rides in the request body, ids included. Delegates to the same
//! services as the interactive API, so behavior and ownership scoping are
//! identical.

use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::project::api::{CreateProjectRequest, ProjectResponse};
use crate::project::entity::ProjectStatus;
use crate::project::service::ProjectService;
use crate::shared::envelope::BaseResponse;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::task::api::{CreateTaskRequest, TaskResponse};
use crate::task::entity::TaskStatus;
use crate::task::service::TaskService;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetProjectRequest {
    pub project_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub project_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProjectRequest {
    pub project_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksRequest {
    pub project_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetTaskRequest {
    pub task_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub task_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTaskRequest {
    pub task_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetTaskStatusRequest {
    pub task_id: String,
    /// Omit to reopen a completed task
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetTaskTagsRequest {
    pub task_id: String,
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetTaskScheduleRequest {
    pub task_id: String,
    pub due_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetTaskTimeRequest {
    pub task_id: String,
    /// Omit to clear the estimate
    pub estimated_time_hours: Option<f64>,
}

#[derive(Clone)]
pub struct AgentState {
    pub project_service: Arc<ProjectService>,
    pub task_service: Arc<TaskService>,
}

/// Tool: create a project
#[utoipa::path(
    post,
    path = "/create-project",
    tag = "agent",
    operation_id = "agentCreateProject",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project created", body = BaseResponse<ProjectResponse>)
    )
)]
pub async fn create_project(
    State(state): State<AgentState>,
    auth: Authenticated,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<BaseResponse<ProjectResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let project = state
        .project_service
        .create(&auth.member_id, &req.name, req.description)
        .await?;
    Ok(Json(BaseResponse::ok(project.into())))
}

/// Tool: list the member's projects
#[utoipa::path(
    post,
    path = "/list-projects",
    tag = "agent",
    operation_id = "agentListProjects",
    responses(
        (status = 200, description = "Projects", body = BaseResponse<Vec<ProjectResponse>>)
    )
)]
pub async fn list_projects(
    State(state): State<AgentState>,
    auth: Authenticated,
) -> Result<Json<BaseResponse<Vec<ProjectResponse>>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let projects = state.project_service.list(&auth.member_id).await?;
    Ok(Json(BaseResponse::ok(
        projects.into_iter().map(Into::into).collect(),
    )))
}

/// Tool: fetch one project
#[utoipa::path(
    post,
    path = "/get-project",
    tag = "agent",
    operation_id = "agentGetProject",
    request_body = GetProjectRequest,
    responses(
        (status = 200, description = "Project", body = BaseResponse<ProjectResponse>),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    State(state): State<AgentState>,
    auth: Authenticated,
    Json(req): Json<GetProjectRequest>,
) -> Result<Json<BaseResponse<ProjectResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let project = state
        .project_service
        .get(&auth.member_id, &req.project_id)
        .await?;
    Ok(Json(BaseResponse::ok(project.into())))
}

/// Tool: update a project's fields
#[utoipa::path(
    post,
    path = "/update-project",
    tag = "agent",
    operation_id = "agentUpdateProject",
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = BaseResponse<ProjectResponse>),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project(
    State(state): State<AgentState>,
    auth: Authenticated,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<BaseResponse<ProjectResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let project = state
        .project_service
        .update(
            &auth.member_id,
            &req.project_id,
            req.name,
            req.description,
            req.status,
        )
        .await?;
    Ok(Json(BaseResponse::ok(project.into())))
}

/// Tool: delete a project and its tasks
#[utoipa::path(
    post,
    path = "/delete-project",
    tag = "agent",
    operation_id = "agentDeleteProject",
    request_body = DeleteProjectRequest,
    responses(
        (status = 200, description = "Project deleted"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete_project(
    State(state): State<AgentState>,
    auth: Authenticated,
    Json(req): Json<DeleteProjectRequest>,
) -> Result<Json<BaseResponse<()>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    state
        .project_service
        .delete(&auth.member_id, &req.project_id)
        .await?;
    Ok(Json(BaseResponse::success("project deleted")))
}

/// Tool: create a task
#[utoipa::path(
    post,
    path = "/create-task",
    tag = "agent",
    operation_id = "agentCreateTask",
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Task created", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Project or parent task not found")
    )
)]
pub async fn create_task(
    State(state): State<AgentState>,
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

/// Tool: list tasks in a project
#[utoipa::path(
    post,
    path = "/list-tasks",
    tag = "agent",
    operation_id = "agentListTasks",
    request_body = ListTasksRequest,
    responses(
        (status = 200, description = "Tasks", body = BaseResponse<Vec<TaskResponse>>),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_tasks(
    State(state): State<AgentState>,
    auth: Authenticated,
    Json(req): Json<ListTasksRequest>,
) -> Result<Json<BaseResponse<Vec<TaskResponse>>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let tasks = state
        .task_service
        .list_by_project(&auth.member_id, &req.project_id)
        .await?;
    Ok(Json(BaseResponse::ok(
        tasks.into_iter().map(Into::into).collect(),
    )))
}

/// Tool: fetch one task
#[utoipa::path(
    post,
    path = "/get-task",
    tag = "agent",
    operation_id = "agentGetTask",
    request_body = GetTaskRequest,
    responses(
        (status = 200, description = "Task", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn get_task(
    State(state): State<AgentState>,
    auth: Authenticated,
    Json(req): Json<GetTaskRequest>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state.task_service.get(&auth.member_id, &req.task_id).await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// Tool: update a task's fields
#[utoipa::path(
    post,
    path = "/update-task",
    tag = "agent",
    operation_id = "agentUpdateTask",
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn update_task(
    State(state): State<AgentState>,
    auth: Authenticated,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state
        .task_service
        .update(
            &auth.member_id,
            &req.task_id,
            req.title,
            req.description,
            req.priority,
        )
        .await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// Tool: delete a task
#[utoipa::path(
    post,
    path = "/delete-task",
    tag = "agent",
    operation_id = "agentDeleteTask",
    request_body = DeleteTaskRequest,
    responses(
        (status = 200, description = "Task deleted"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn delete_task(
    State(state): State<AgentState>,
    auth: Authenticated,
    Json(req): Json<DeleteTaskRequest>,
) -> Result<Json<BaseResponse<()>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    state
        .task_service
        .delete(&auth.member_id, &req.task_id)
        .await?;
    Ok(Json(BaseResponse::success("task deleted")))
}

/// Tool: set or reopen a task's status
#[utoipa::path(
    post,
    path = "/set-task-status",
    tag = "agent",
    operation_id = "agentSetTaskStatus",
    request_body = SetTaskStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn set_task_status(
    State(state): State<AgentState>,
    auth: Authenticated,
    Json(req): Json<SetTaskStatusRequest>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state
        .task_service
        .update_status(&auth.member_id, &req.task_id, req.status)
        .await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// Tool: set a task's tags
#[utoipa::path(
    post,
    path = "/set-task-tags",
    tag = "agent",
    operation_id = "agentSetTaskTags",
    request_body = SetTaskTagsRequest,
    responses(
        (status = 200, description = "Tags updated", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn set_task_tags(
    State(state): State<AgentState>,
    auth: Authenticated,
    Json(req): Json<SetTaskTagsRequest>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state
        .task_service
        .update_tags(&auth.member_id, &req.task_id, req.tags)
        .await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// Tool: set a task's due date
#[utoipa::path(
    post,
    path = "/set-task-schedule",
    tag = "agent",
    operation_id = "agentSetTaskSchedule",
    request_body = SetTaskScheduleRequest,
    responses(
        (status = 200, description = "Schedule updated", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn set_task_schedule(
    State(state): State<AgentState>,
    auth: Authenticated,
    Json(req): Json<SetTaskScheduleRequest>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state
        .task_service
        .update_schedule(&auth.member_id, &req.task_id, req.due_date)
        .await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// Tool: set a task's time estimate
#[utoipa::path(
    post,
    path = "/set-task-time",
    tag = "agent",
    operation_id = "agentSetTaskTime",
    request_body = SetTaskTimeRequest,
    responses(
        (status = 200, description = "Estimate updated", body = BaseResponse<TaskResponse>),
        (status = 404, description = "Task not found")
    )
)]
pub async fn set_task_time(
    State(state): State<AgentState>,
    auth: Authenticated,
    Json(req): Json<SetTaskTimeRequest>,
) -> Result<Json<BaseResponse<TaskResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let task = state
        .task_service
        .update_time(&auth.member_id, &req.task_id, req.estimated_time_hours)
        .await?;
    Ok(Json(BaseResponse::ok(task.into())))
}

/// Create the agent router
pub fn agent_router(state: AgentState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_project))
        .routes(routes!(list_projects))
        .routes(routes!(get_project))
        .routes(routes!(update_project))
        .routes(routes!(delete_project))
        .routes(routes!(create_task))
        .routes(routes!(list_tasks))
        .routes(routes!(get_task))
        .routes(routes!(update_task))
        .routes(routes!(delete_task))
        .routes(routes!(set_task_status))
        .routes(routes!(set_task_tags))
        .routes(routes!(set_task_schedule))
        .routes(routes!(set_task_time))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_requests_deserialize_camel_case() {
        let req: SetTaskTimeRequest =
            serde_json::from_str(r#"{"taskId":"t1","estimatedTimeHours":2.5}"#).unwrap();
        assert_eq!(req.task_id, "t1");
        assert_eq!(req.estimated_time_hours, Some(2.5));

        let req: UpdateTaskRequest =
            serde_json::from_str(r#"{"taskId":"t1","priority":4}"#).unwrap();
        assert_eq!(req.priority, Some(4));
        assert!(req.title.is_none());

        let req: DeleteProjectRequest = serde_json::from_str(r#"{"projectId":"p1"}"#).unwrap();
        assert_eq!(req.project_id, "p1");
    }
}
