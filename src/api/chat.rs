//! Chat endpoints

use crate::api::ExtractUser;
use crate::api::chat::schemas::{Ack, ConversationList, NewChatMessage};
use crate::core::error::ChatError;
use crate::core::traits::ChatService;
use axum::extract::Path;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/new", post(submit_message))
        .route("/all-chats", get(list_conversations))
        .route("/delete-all-chats", delete(delete_all_conversations))
        .route(
            "/:conversation_id",
            get(get_conversation).delete(delete_conversation),
        )
}

/// Unauthenticated greeting. Nesting maps the router's `/` to the bare
/// `/api/chat`, so the app builders also register this at `/api/chat/`.
pub async fn index() -> &'static str {
    "Hello from the chat API!"
}

async fn submit_message(
    Inject(chat_service): Inject<dyn ChatService>,
    ExtractUser(current_user): ExtractUser,
    Json(body): Json<NewChatMessage>,
) -> Result<Json<schemas::ChatTranscript>, ChatError> {
    let message = match body.message {
        Some(message) if !message.trim().is_empty() => message,
        _ => return Err(ChatError::EmptyMessage),
    };

    let lang = match body.lang {
        Some(lang) if !lang.is_empty() => lang,
        _ => "en".to_owned(),
    };

    let transcript = chat_service
        .submit_message(current_user, message, lang, body.conversation_id)
        .await?;

    Ok(Json(transcript.into()))
}

async fn list_conversations(
    Inject(chat_service): Inject<dyn ChatService>,
    ExtractUser(current_user): ExtractUser,
) -> Result<Json<ConversationList>, ChatError> {
    let summaries = chat_service.list_conversations(current_user).await?;

    Ok(Json(ConversationList {
        conversations: summaries
            .into_iter()
            .map(schemas::ConversationSummary::from)
            .collect(),
    }))
}

async fn get_conversation(
    Inject(chat_service): Inject<dyn ChatService>,
    ExtractUser(current_user): ExtractUser,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<schemas::ChatTranscript>, ChatError> {
    let transcript = chat_service
        .get_conversation(current_user, conversation_id)
        .await?;

    Ok(Json(transcript.into()))
}

async fn delete_conversation(
    Inject(chat_service): Inject<dyn ChatService>,
    ExtractUser(current_user): ExtractUser,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Ack>, ChatError> {
    chat_service
        .delete_conversation(current_user, conversation_id)
        .await?;

    Ok(Json(Ack {
        message: "Conversation deleted",
    }))
}

async fn delete_all_conversations(
    Inject(chat_service): Inject<dyn ChatService>,
    ExtractUser(current_user): ExtractUser,
) -> Result<Json<Ack>, ChatError> {
    chat_service.delete_all_conversations(current_user).await?;

    Ok(Json(Ack {
        message: "All conversations deleted",
    }))
}

pub mod schemas {
    use crate::core::traits;
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    /// `message` is required by the API contract, but deserializes as an
    /// `Option` so a body lacking it still gets the regular 400 error shape
    /// instead of a bare deserialization rejection.
    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct NewChatMessage {
        pub message: Option<String>,
        pub lang: Option<String>,
        pub conversation_id: Option<Uuid>,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "lowercase")]
    pub enum ChatRole {
        User,
        Assistant,
    }

    impl From<entities::ChatRole> for ChatRole {
        fn from(role: entities::ChatRole) -> Self {
            match role {
                entities::ChatRole::User => ChatRole::User,
                entities::ChatRole::Assistant => ChatRole::Assistant,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ChatEntry {
        pub role: ChatRole,
        pub content: String,
    }

    impl From<entities::ChatEntry> for ChatEntry {
        fn from(entry: entities::ChatEntry) -> Self {
            ChatEntry {
                role: entry.role.into(),
                content: entry.content,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ChatTranscript {
        pub chats: Vec<ChatEntry>,
        pub conversation_id: Uuid,
    }

    impl From<traits::ChatTranscript> for ChatTranscript {
        fn from(transcript: traits::ChatTranscript) -> Self {
            ChatTranscript {
                chats: transcript.chats.into_iter().map(ChatEntry::from).collect(),
                conversation_id: transcript.conversation_id,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ConversationSummary {
        #[serde(rename = "_id")]
        pub id: Uuid,
        pub title: String,
        #[serde(rename = "updatedAt")]
        pub updated_at: DateTime<Utc>,
    }

    impl From<entities::ConversationSummary> for ConversationSummary {
        fn from(summary: entities::ConversationSummary) -> Self {
            ConversationSummary {
                id: summary.id,
                title: summary.title,
                updated_at: summary.updated_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ConversationList {
        pub conversations: Vec<ConversationSummary>,
    }

    #[derive(Serialize, Debug)]
    pub struct Ack {
        pub message: &'static str,
    }
}
