use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::models::{Discipline, ExamResult, Profile, Session, Skill};
use super::{BackendError, ExamBackend};
use crate::core::config::Settings;

const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Clone)]
pub(crate) struct HttpExamBackend {
    client: Client,
    base_url: String,
    service_token: Option<String>,
    forward_auth: bool,
    bearer: Option<String>,
}

impl HttpExamBackend {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self, BackendError> {
        let exam_api = settings.exam_api();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(exam_api.timeout_seconds))
            .build()?;

        let service_token = Some(exam_api.token.clone()).filter(|token| !token.is_empty());

        Ok(Self {
            client,
            base_url: exam_api.base_url.trim_end_matches('/').to_string(),
            bearer: service_token.clone(),
            service_token,
            forward_auth: exam_api.forward_auth,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{path}", self.base_url));
        match &self.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self.request(Method::GET, path).send().await?;
        let response = ensure_success(response).await?;
        let raw_body = response.text().await?;

        serde_json::from_str(&raw_body).map_err(|err| {
            BackendError::Decode(format!("GET {path}: {err}: {}", truncate(&raw_body)))
        })
    }
}

#[async_trait]
impl ExamBackend for HttpExamBackend {
    async fn exam_results(&self, session_id: Option<i64>) -> Result<Vec<ExamResult>, BackendError> {
        match session_id {
            Some(id) => self.get_json(&format!("/skill-test-results/session/{id}")).await,
            None => self.get_json("/skill-test-results").await,
        }
    }

    async fn session(&self, id: i64) -> Result<Session, BackendError> {
        self.get_json(&format!("/sessions/{id}")).await
    }

    async fn skill(&self, id: i64) -> Result<Skill, BackendError> {
        self.get_json(&format!("/skills/{id}")).await
    }

    async fn disciplines(&self) -> Result<Vec<Discipline>, BackendError> {
        self.get_json("/disciplines").await
    }

    async fn profile(&self, teacher_id: i64) -> Result<Profile, BackendError> {
        self.get_json(&format!("/profile/{teacher_id}")).await
    }

    async fn delete_exam_result(&self, id: i64) -> Result<(), BackendError> {
        let response =
            self.request(Method::DELETE, &format!("/skill-test-results/{id}")).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn health(&self) -> Result<(), BackendError> {
        // Any HTTP answer proves the backend is up; only transport errors count.
        self.request(Method::HEAD, "").send().await?;
        Ok(())
    }

    fn with_bearer(&self, bearer: Option<&str>) -> Arc<dyn ExamBackend> {
        let mut scoped = self.clone();
        scoped.bearer = match bearer.filter(|token| self.forward_auth && !token.is_empty()) {
            Some(token) => Some(token.to_string()),
            None => self.service_token.clone(),
        };
        Arc::new(scoped)
    }
}

async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let raw_body = response.text().await.unwrap_or_default();
    Err(BackendError::Status { status: status.as_u16(), message: extract_error_message(&raw_body) })
}

/// Spring error bodies carry `message`; fall back to `error`, then to the raw text.
fn extract_error_message(raw_body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(raw_body).ok();
    let from_json = parsed.as_ref().and_then(|value| {
        ["message", "error", "detail"].iter().find_map(|key| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|message| !message.trim().is_empty())
                .map(str::to_string)
        })
    });

    match from_json {
        Some(message) => message,
        None if raw_body.trim().is_empty() => "empty response body".to_string(),
        None => truncate(raw_body),
    }
}

fn truncate(raw: &str) -> String {
    if raw.chars().count() <= MAX_ERROR_BODY_CHARS {
        return raw.to_string();
    }
    let mut short: String = raw.chars().take(MAX_ERROR_BODY_CHARS).collect();
    short.push('…');
    short
}
