//! Project Repository

use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::project::entity::Project;
use crate::shared::error::Result;

pub struct ProjectRepository {
    collection: Collection<Project>,
}

impl ProjectRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("projects"),
        }
    }

    pub async fn insert(&self, project: &Project) -> Result<()> {
        self.collection.insert_one(project).await?;
        Ok(())
    }

    /// Owner-scoped lookup; a project belonging to another member reads as
    /// absent
    pub async fn find_owned(&self, member_id: &str, id: &str) -> Result<Option<Project>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id, "memberId": member_id })
            .await?)
    }

    pub async fn find_all_owned(&self, member_id: &str) -> Result<Vec<Project>> {
        let cursor = self
            .collection
            .find(doc! { "memberId": member_id })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, project: &Project) -> Result<bool> {
        let result = self
            .collection
            .replace_one(
                doc! { "_id": &project.id, "memberId": &project.member_id },
                project,
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    pub async fn delete_owned(&self, member_id: &str, id: &str) -> Result<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id, "memberId": member_id })
            .await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    // Repository tests require MongoDB connection
    // These would typically be integration tests
}
