//! Refresh Session Repository
//!
//! Persists refresh sessions in MongoDB. Saving upserts on the member id, so
//! a login from a new device silently invalidates the old session.

use mongodb::{bson::doc, Collection, Database};

use crate::auth::refresh_session::RefreshSession;
use crate::shared::error::Result;

pub struct RefreshSessionRepository {
    collection: Collection<RefreshSession>,
}

impl RefreshSessionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("refresh_sessions"),
        }
    }

    /// Upsert the session for a member, replacing any previous one
    pub async fn save(&self, session: &RefreshSession) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &session.member_id }, session)
            .upsert(true)
            .await?;
        Ok(())
    }

    /// Find the session for a member
    pub async fn find(&self, member_id: &str) -> Result<Option<RefreshSession>> {
        Ok(self.collection.find_one(doc! { "_id": member_id }).await?)
    }

    /// Delete the session for a member. Idempotent: deleting a missing
    /// session is not an error.
    pub async fn delete(&self, member_id: &str) -> Result<()> {
        self.collection.delete_one(doc! { "_id": member_id }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Repository tests require MongoDB connection
    // These would typically be integration tests
}
