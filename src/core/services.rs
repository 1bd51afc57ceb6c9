//! Implementations for the services the app needs.
//!

use crate::core::answer::fallback_reply;
use crate::core::error::ChatError;
use crate::core::traits::{AnswerProvider, ChatService, ChatTranscript};
use crate::infrastructure::entities;
use crate::infrastructure::traits::{ConversationRepository, UserDirectory};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, inject, injectable};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use uuid::Uuid;

/// Per-conversation guards, so two concurrent submissions to the same
/// conversation cannot interleave their read-append-persist cycles and
/// drop each other's entries.
///
/// Registered as a singleton. The registry keeps weak references and
/// reaps dead entries on lookup, so it only tracks conversations with
/// a turn in flight.
pub struct ConversationLocks {
    locks: Mutex<HashMap<Uuid, Weak<tokio::sync::Mutex<()>>>>,
}

#[injectable]
impl ConversationLocks {
    #[inject]
    pub fn new() -> ConversationLocks {
        ConversationLocks {
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn guard_for(&self, conversation_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().expect("conversation lock registry poisoned");
        locks.retain(|_, guard| guard.strong_count() > 0);

        if let Some(live) = locks.get(&conversation_id).and_then(|guard| guard.upgrade()) {
            return live;
        }

        let guard = Arc::new(tokio::sync::Mutex::new(()));
        locks.insert(conversation_id, Arc::downgrade(&guard));
        guard
    }
}

pub struct MyChatService {
    users: Ref<dyn UserDirectory>,
    conversations: Ref<dyn ConversationRepository>,
    answers: Ref<dyn AnswerProvider>,
    locks: Ref<ConversationLocks>,
}

#[injectable(ChatService)]
impl MyChatService {
    #[inject]
    pub fn new(
        users: Ref<dyn UserDirectory>,
        conversations: Ref<dyn ConversationRepository>,
        answers: Ref<dyn AnswerProvider>,
        locks: Ref<ConversationLocks>,
    ) -> MyChatService {
        MyChatService {
            users,
            conversations,
            answers,
            locks,
        }
    }
}

impl MyChatService {
    async fn require_user(&self, user_id: Uuid) -> Result<(), ChatError> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or(ChatError::Unauthenticated)?;
        Ok(())
    }

    /// Appends the user message and an assistant reply, then persists the
    /// whole document. The caller holds the conversation guard where one
    /// is needed.
    async fn run_turn(
        &self,
        mut conversation: entities::Conversation,
        message: &str,
        lang: &str,
    ) -> Result<ChatTranscript, ChatError> {
        conversation.chats.push(entities::ChatEntry::user(message));

        let reply = match self.answers.answer(message, lang).await {
            Ok(answer) => answer,
            Err(error) => {
                warn!("answer service failed: {error}");
                fallback_reply(&error)
            }
        };
        conversation
            .chats
            .push(entities::ChatEntry::assistant(reply));
        conversation.updated_at = Utc::now();

        let stored = self.conversations.upsert_conversation(conversation).await?;
        Ok(stored.into())
    }
}

#[async_trait]
impl ChatService for MyChatService {
    async fn submit_message(
        &self,
        user_id: Uuid,
        message: String,
        lang: String,
        conversation_id: Option<Uuid>,
    ) -> Result<ChatTranscript, ChatError> {
        self.require_user(user_id).await?;

        match conversation_id {
            Some(conversation_id) => {
                let guard = self.locks.guard_for(conversation_id);
                let _held = guard.lock().await;

                let conversation = self
                    .conversations
                    .find_conversation(user_id, conversation_id)
                    .await?
                    .ok_or(ChatError::ConversationNotFound)?;

                self.run_turn(conversation, &message, &lang).await
            }
            None => {
                let conversation = entities::Conversation::new(user_id, derive_title(&message));
                self.run_turn(conversation, &message, &lang).await
            }
        }
    }

    async fn list_conversations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<entities::ConversationSummary>, ChatError> {
        self.require_user(user_id).await?;
        Ok(self.conversations.list_summaries(user_id).await?)
    }

    async fn get_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<ChatTranscript, ChatError> {
        self.require_user(user_id).await?;

        let conversation = self
            .conversations
            .find_conversation(user_id, conversation_id)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;

        Ok(conversation.into())
    }

    async fn delete_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<(), ChatError> {
        self.require_user(user_id).await?;

        let deleted = self
            .conversations
            .delete_conversation(user_id, conversation_id)
            .await?;
        if !deleted {
            return Err(ChatError::ConversationNotFound);
        }
        Ok(())
    }

    async fn delete_all_conversations(&self, user_id: Uuid) -> Result<(), ChatError> {
        self.require_user(user_id).await?;

        let deleted = self.conversations.delete_all_conversations(user_id).await?;
        debug!("deleted {deleted} conversations for user {user_id}");
        Ok(())
    }
}

/// Conversation titles are the first message clipped to 30 characters,
/// with a `...` marker when clipping happened. Counted in characters so
/// multi-byte input never gets split.
fn derive_title(message: &str) -> String {
    let mut title: String = message.chars().take(30).collect();
    if message.chars().count() > 30 {
        title.push_str("...");
    }
    title
}
