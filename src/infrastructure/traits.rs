//! Infrastructure traits, used for DI on higher levels

use crate::infrastructure::entities;
use async_trait::async_trait;
use uuid::Uuid;

/// Read-only access to the identity records the session layer maintains.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<entities::User>, sqlx::Error>;
}

/// Conversation persistence. Every method that names a conversation filters
/// by `(id, user_id)` so foreign rows are unreachable at the query level.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Option<entities::Conversation>, sqlx::Error>;

    /// Summaries for the given user, most recently updated first.
    async fn list_summaries(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<entities::ConversationSummary>, sqlx::Error>;

    /// Writes the conversation document whole: inserts a new row, or
    /// replaces `chats` and `updated_at` on an existing one. The update
    /// only applies to a row with the same owner; an id collision under a
    /// different owner updates nothing and errors.
    async fn upsert_conversation(
        &self,
        conversation: entities::Conversation,
    ) -> Result<entities::Conversation, sqlx::Error>;

    /// Returns `false` when no matching conversation existed.
    async fn delete_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<bool, sqlx::Error>;

    /// Returns the number of conversations removed.
    async fn delete_all_conversations(&self, user_id: Uuid) -> Result<u64, sqlx::Error>;
}
