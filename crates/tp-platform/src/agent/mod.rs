//! Agent Module
//!
//! Tool-style mirror of the project/task API for LLM invocation.

pub mod api;

pub use api::{agent_router, AgentState};
