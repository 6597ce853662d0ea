//! Task Repository

use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::shared::error::Result;
use crate::task::entity::Task;

pub struct TaskRepository {
    collection: Collection<Task>,
}

impl TaskRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("tasks"),
        }
    }

    pub async fn insert(&self, task: &Task) -> Result<()> {
        self.collection.insert_one(task).await?;
        Ok(())
    }

    pub async fn find_owned(&self, member_id: &str, id: &str) -> Result<Option<Task>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id, "memberId": member_id })
            .await?)
    }

    pub async fn find_by_project(&self, member_id: &str, project_id: &str) -> Result<Vec<Task>> {
        let cursor = self
            .collection
            .find(doc! { "memberId": member_id, "projectId": project_id })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, task: &Task) -> Result<bool> {
        let result = self
            .collection
            .replace_one(doc! { "_id": &task.id, "memberId": &task.member_id }, task)
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

    /// Remove all tasks under a project when the project is deleted
    pub async fn delete_by_project(&self, member_id: &str, project_id: &str) -> Result<u64> {
        let result = self
            .collection
            .delete_many(doc! { "memberId": member_id, "projectId": project_id })
            .await?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    // Repository tests require MongoDB connection
    // These would typically be integration tests
}
