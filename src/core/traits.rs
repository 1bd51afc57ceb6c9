//! DI "Interfaces"

use crate::core::error::{AnswerError, ChatError};
use crate::infrastructure::entities;
use async_trait::async_trait;
use uuid::Uuid;

/// A conversation transcript as handed back to the API layer.
#[derive(Debug, Clone)]
pub struct ChatTranscript {
    pub conversation_id: Uuid,
    pub chats: Vec<entities::ChatEntry>,
}

impl From<entities::Conversation> for ChatTranscript {
    fn from(conversation: entities::Conversation) -> Self {
        ChatTranscript {
            conversation_id: conversation.id,
            chats: conversation.chats.0,
        }
    }
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Appends a user message to a conversation and obtains an assistant
    /// reply for it.
    ///
    /// With no `conversation_id` a new conversation is started, titled after
    /// the message. Returns `Err` if the user is not registered, if the
    /// conversation does not exist for this user, or if the store fails. A
    /// failing answer service is not an error: the assistant entry then
    /// carries a placeholder reply.
    async fn submit_message(
        &self,
        user_id: Uuid,
        message: String,
        lang: String,
        conversation_id: Option<Uuid>,
    ) -> Result<ChatTranscript, ChatError>;

    /// Lists the user's conversations, most recently updated first.
    async fn list_conversations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<entities::ConversationSummary>, ChatError>;

    /// Fetches a full conversation transcript.
    ///
    /// Returns `Err` if the conversation does not exist for this user.
    async fn get_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<ChatTranscript, ChatError>;

    /// Deletes a conversation.
    ///
    /// Returns `Err` if the conversation does not exist for this user.
    async fn delete_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<(), ChatError>;

    /// Deletes every conversation the user owns.
    ///
    /// Owning none is not an error.
    async fn delete_all_conversations(&self, user_id: Uuid) -> Result<(), ChatError>;
}

/// Produces an answer for a medical question.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    async fn answer(&self, question: &str, lang: &str) -> Result<String, AnswerError>;
}
