//! Member Module
//!
//! Member accounts, linked social identities, and the member API.

pub mod api;
pub mod entity;
pub mod repository;
pub mod service;

pub use api::{member_router, MembersState};
pub use entity::{AuthProvider, Member, MemberAuthProvider};
pub use repository::{MemberAuthProviderRepository, MemberRepository};
pub use service::{decide_bind_outcome, BindOutcome, MemberService};
