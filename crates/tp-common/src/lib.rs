//! Shared plumbing for the TaskPilot services.

pub mod logging;
