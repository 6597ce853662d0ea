//! Project Module

pub mod api;
pub mod entity;
pub mod repository;
pub mod service;

pub use api::{project_router, ProjectsState};
pub use entity::{Project, ProjectStatus};
pub use repository::ProjectRepository;
pub use service::ProjectService;
