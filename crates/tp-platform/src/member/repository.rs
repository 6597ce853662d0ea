//! Member Repositories
//!
//! MongoDB persistence for members and their linked social accounts.

use mongodb::{bson::doc, Collection, Database};

use crate::member::entity::{AuthProvider, Member, MemberAuthProvider};
use crate::shared::error::Result;

pub struct MemberRepository {
    collection: Collection<Member>,
}

impl MemberRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("members"),
        }
    }

    pub async fn insert(&self, member: &Member) -> Result<()> {
        self.collection.insert_one(member).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Member>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_login_id(&self, login_id: &str) -> Result<Option<Member>> {
        Ok(self.collection.find_one(doc! { "loginId": login_id }).await?)
    }

    pub async fn update(&self, member: &Member) -> Result<bool> {
        let result = self
            .collection
            .replace_one(doc! { "_id": &member.id }, member)
            .await?;
        Ok(result.modified_count > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}

pub struct MemberAuthProviderRepository {
    collection: Collection<MemberAuthProvider>,
}

impl MemberAuthProviderRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("member_auth_providers"),
        }
    }

    pub async fn insert(&self, link: &MemberAuthProvider) -> Result<()> {
        self.collection.insert_one(link).await?;
        Ok(())
    }

    /// Lookup by the provider-scoped identity, the key the OAuth2 callback
    /// resolves members with
    pub async fn find_by_provider_and_user_id(
        &self,
        provider: AuthProvider,
        provider_user_id: &str,
    ) -> Result<Option<MemberAuthProvider>> {
        let provider_bson = bson::to_bson(&provider)?;
        Ok(self
            .collection
            .find_one(doc! {
                "provider": provider_bson,
                "providerUserId": provider_user_id
            })
            .await?)
    }

    pub async fn find_by_member(&self, member_id: &str) -> Result<Vec<MemberAuthProvider>> {
        use futures::TryStreamExt;
        let cursor = self
            .collection
            .find(doc! { "memberId": member_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn delete_by_member(&self, member_id: &str) -> Result<u64> {
        let result = self
            .collection
            .delete_many(doc! { "memberId": member_id })
            .await?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    // Repository tests require MongoDB connection
    // These would typically be integration tests
}
