use crate::core::error::ChatError;
use async_trait::async_trait;
use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use log::error;
use serde::Serialize;
use std::str::FromStr;
use uuid::Uuid;

pub mod chat;

const X_USER_ID: &str = "X-User-ID";

/// The authenticated caller, resolved from the `X-User-ID` header.
///
/// A missing or malformed header rejects with 401 before the handler
/// runs; whether the id belongs to a registered user is checked in the
/// service layer.
#[derive(Debug)]
pub struct ExtractUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractUser
where
    S: Send + Sync,
{
    type Rejection = ChatError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, ChatError> {
        let user_id = parts
            .headers
            .get(X_USER_ID)
            .ok_or(ChatError::Unauthenticated)?
            .to_str()
            .map_err(|_| ChatError::Unauthenticated)?;
        let user_id = Uuid::from_str(user_id).map_err(|_| ChatError::Unauthenticated)?;

        Ok(ExtractUser(user_id))
    }
}

#[derive(Serialize)]
struct ErrorMessage {
    message: String,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = match &self {
            ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
            ChatError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ChatError::ConversationNotFound => StatusCode::NOT_FOUND,
            ChatError::Storage(error) => {
                error!("storage failure: {error}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorMessage {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
