//! Task Module

pub mod api;
pub mod entity;
pub mod repository;
pub mod service;

pub use api::{task_router, TasksState};
pub use entity::{Task, TaskStatus};
pub use repository::TaskRepository;
pub use service::TaskService;
