//! HTTP client for the external answer service.
//!
//! The service exposes a single `POST <base>/ask` endpoint taking
//! `{"question", "lang"}` and returning `{"answer"}`.

use crate::core::error::AnswerError;
use crate::core::traits::AnswerProvider;
use async_trait::async_trait;
use di::{inject, injectable};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::RwLock;
use std::time::Duration;

/// Override slot for tests. `more-di` cannot register pre-built instances,
/// so integration tests park their stub server's base URL here and the
/// DI-created provider picks it up.
static TEST_BASE_URL: RwLock<Option<String>> = RwLock::new(None);

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
    lang: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

pub struct HttpAnswerProvider {
    client: Client,
    ask_url: String,
}

#[injectable(AnswerProvider)]
impl HttpAnswerProvider {
    #[inject]
    pub fn create() -> HttpAnswerProvider {
        if let Some(base_url) = TEST_BASE_URL
            .read()
            .expect("test url lock poisoned")
            .clone()
        {
            return HttpAnswerProvider::new(&base_url, Duration::from_secs(5));
        }

        dotenvy::dotenv().ok();
        let base_url = env::var("ANSWER_API_URL").unwrap_or("http://127.0.0.1:5000".to_owned());
        let timeout_secs = env::var("ANSWER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| u64::from_str(&s).ok())
            .unwrap_or(30);

        HttpAnswerProvider::new(&base_url, Duration::from_secs(timeout_secs))
    }

    pub fn new(base_url: &str, timeout: Duration) -> HttpAnswerProvider {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        HttpAnswerProvider {
            client,
            ask_url: normalize_ask_url(base_url),
        }
    }

    pub fn set_test_base_url(base_url: impl Into<String>) {
        *TEST_BASE_URL.write().expect("test url lock poisoned") = Some(base_url.into());
    }

    pub fn clear_test_base_url() {
        *TEST_BASE_URL.write().expect("test url lock poisoned") = None;
    }
}

#[async_trait]
impl AnswerProvider for HttpAnswerProvider {
    async fn answer(&self, question: &str, lang: &str) -> Result<String, AnswerError> {
        let body = AskRequest { question, lang };

        let response = self
            .client
            .post(&self.ask_url)
            .json(&body)
            .send()
            .await
            .map_err(AnswerError::Unreachable)?;

        debug!("answer service status: {}", response.status());

        if !response.status().is_success() {
            return Err(AnswerError::Remote {
                status: response.status(),
            });
        }

        let decoded: AskResponse = response
            .json()
            .await
            .map_err(AnswerError::InvalidResponse)?;

        Ok(decoded.answer)
    }
}

/// Builds the `/ask` endpoint URL from a configured base.
///
/// Tolerates trailing slashes and a base that already ends in `/ask`,
/// so `http://host`, `http://host/` and `http://host/ask/` all resolve
/// to `http://host/ask`.
fn normalize_ask_url(base_url: &str) -> String {
    let mut base = base_url.trim_end_matches('/');
    if base.len() >= 4 && base.is_char_boundary(base.len() - 4) {
        let (head, tail) = base.split_at(base.len() - 4);
        if tail.eq_ignore_ascii_case("/ask") {
            base = head;
        }
    }
    format!("{}/ask", base.trim_end_matches('/'))
}

/// Assistant reply used when the answer service fails.
///
/// The transcript still gains an assistant entry in that case, so the
/// wording doubles as the user-facing explanation.
pub fn fallback_reply(error: &AnswerError) -> String {
    match error {
        AnswerError::Unreachable(_) => {
            "I am sorry, the medical answer service is currently offline. Please try again later."
                .to_owned()
        }
        AnswerError::Remote { status } => format!(
            "I am sorry, the medical answer service could not process your question (status {}). Please try again later.",
            status.as_u16()
        ),
        AnswerError::InvalidResponse(_) => {
            "I am sorry, I could not understand the medical answer service's response. Please try again."
                .to_owned()
        }
    }
}
