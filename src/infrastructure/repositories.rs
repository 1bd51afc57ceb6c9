//! DB Repository abstractions

use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities;
use crate::infrastructure::traits::{ConversationRepository, UserDirectory};
use async_trait::async_trait;
use di::{Ref, injectable};
use uuid::Uuid;

#[injectable(UserDirectory)]
pub struct DbUserDirectory {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl UserDirectory for DbUserDirectory {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<entities::User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&**self.connection)
            .await
    }
}

#[injectable(ConversationRepository)]
pub struct DbConversationRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl ConversationRepository for DbConversationRepository {
    async fn find_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Option<entities::Conversation>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM conversations WHERE id = ? AND user_id = ?")
            .bind(conversation_id)
            .bind(user_id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn list_summaries(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<entities::ConversationSummary>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, title, updated_at FROM conversations \
             WHERE user_id = ? ORDER BY datetime(updated_at) DESC",
        )
        .bind(user_id)
        .fetch_all(&**self.connection)
        .await
    }

    async fn upsert_conversation(
        &self,
        conversation: entities::Conversation,
    ) -> Result<entities::Conversation, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO conversations (id, user_id, title, chats, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (id) DO UPDATE \
             SET chats = excluded.chats, updated_at = excluded.updated_at \
             WHERE conversations.user_id = excluded.user_id \
             RETURNING *",
        )
        .bind(conversation.id)
        .bind(conversation.user_id)
        .bind(conversation.title)
        .bind(conversation.chats)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .fetch_one(&**self.connection)
        .await
    }

    async fn delete_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ? AND user_id = ?")
            .bind(conversation_id)
            .bind(user_id)
            .execute(&**self.connection)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_conversations(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM conversations WHERE user_id = ?")
            .bind(user_id)
            .execute(&**self.connection)
            .await?;

        Ok(result.rows_affected())
    }
}
