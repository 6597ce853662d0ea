//! Project API Endpoints
//!
//! Owner-scoped project CRUD under /api/project. All routes require
//! ROLE_MEMBER.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::project::entity::{Project, ProjectStatus};
use crate::project::service::ProjectService;
use crate::shared::envelope::BaseResponse;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ProjectStatus,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            status: project.status,
        }
    }
}

#[derive(Clone)]
pub struct ProjectsState {
    pub project_service: Arc<ProjectService>,
}

/// Create a project
#[utoipa::path(
    post,
    path = "",
    tag = "project",
    operation_id = "postProject",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project created", body = BaseResponse<ProjectResponse>)
    )
)]
pub async fn create_project(
    State(state): State<ProjectsState>,
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

/// List the member's projects
#[utoipa::path(
    get,
    path = "",
    tag = "project",
    operation_id = "getProjects",
    responses(
        (status = 200, description = "Projects", body = BaseResponse<Vec<ProjectResponse>>)
    )
)]
pub async fn list_projects(
    State(state): State<ProjectsState>,
    auth: Authenticated,
) -> Result<Json<BaseResponse<Vec<ProjectResponse>>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let projects = state.project_service.list(&auth.member_id).await?;
    Ok(Json(BaseResponse::ok(
        projects.into_iter().map(Into::into).collect(),
    )))
}

/// Get one project
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "project",
    operation_id = "getProject",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = BaseResponse<ProjectResponse>),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    State(state): State<ProjectsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<BaseResponse<ProjectResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let project = state.project_service.get(&auth.member_id, &id).await?;
    Ok(Json(BaseResponse::ok(project.into())))
}

/// Update a project
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "project",
    operation_id = "putProject",
    params(("id" = String, Path, description = "Project id")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = BaseResponse<ProjectResponse>),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project(
    State(state): State<ProjectsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<BaseResponse<ProjectResponse>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    let project = state
        .project_service
        .update(&auth.member_id, &id, req.name, req.description, req.status)
        .await?;
    Ok(Json(BaseResponse::ok(project.into())))
}

/// Delete a project
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "project",
    operation_id = "deleteProject",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project deleted"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete_project(
    State(state): State<ProjectsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<BaseResponse<()>>, PlatformError> {
    auth.require_role("ROLE_MEMBER")?;
    state.project_service.delete(&auth.member_id, &id).await?;
    Ok(Json(BaseResponse::success("project deleted")))
}

/// Create the project router
pub fn project_router(state: ProjectsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_project, list_projects))
        .routes(routes!(get_project, update_project, delete_project))
        .with_state(state)
}
