//! Error types for the chat service and the answer client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by [`crate::core::traits::ChatService`] operations.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The submitted message was empty or whitespace-only.
    #[error("message must not be empty")]
    EmptyMessage,
    /// The caller could not be resolved to a registered user.
    #[error("user not registered or token malfunctioned")]
    Unauthenticated,
    /// The conversation does not exist for this user.
    #[error("conversation not found")]
    ConversationNotFound,
    /// The conversation store failed.
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Errors from the external answer service.
///
/// These never reach the HTTP boundary; the chat service recovers from
/// them with a placeholder assistant reply.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// The answer service could not be reached, or the request timed out.
    #[error("answer service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    /// The answer service responded with a non-success status.
    #[error("answer service returned status {status}")]
    Remote { status: StatusCode },
    /// The answer service responded 2xx but the body did not decode.
    #[error("answer service response could not be decoded: {0}")]
    InvalidResponse(#[source] reqwest::Error),
}
