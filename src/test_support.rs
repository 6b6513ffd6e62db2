use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, OnceLock};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use time::OffsetDateTime;
use tokio::sync::{Barrier, Mutex, OwnedMutexGuard};

use crate::api;
use crate::backend::models::{
    Discipline, DisciplineSkill, ExamResult, Profile, Session, Skill, SkillStep, StepScore,
};
use crate::backend::{BackendError, ExamBackend};
use crate::core::{config::Settings, state::AppState, time::parse_datetime_flexible};
use crate::services::enrichment::EnrichedResult;

pub(crate) const TEST_EXAM_API_URL: &str = "http://127.0.0.1:18080/api";

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("RESULTS_ENV", "test");
    std::env::remove_var("ENVIRONMENT");
    std::env::set_var("RESULTS_STRICT_CONFIG", "0");
    std::env::remove_var("RESULTS_HOST");
    std::env::remove_var("RESULTS_PORT");
    std::env::remove_var("PROJECT_NAME");
    std::env::remove_var("VERSION");
    std::env::remove_var("API_V1_STR");
    std::env::remove_var("BACKEND_CORS_ORIGINS");
    std::env::set_var("EXAM_API_URL", TEST_EXAM_API_URL);
    std::env::remove_var("EXAM_API_TOKEN");
    std::env::remove_var("EXAM_API_FORWARD_AUTH");
    std::env::remove_var("EXAM_API_TIMEOUT_SECONDS");
    std::env::remove_var("EXPORT_FILENAME");
    std::env::remove_var("RESULTS_LOG_LEVEL");
    std::env::remove_var("RESULTS_LOG_JSON");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
}

pub(crate) async fn setup_test_context(backend: StubBackend) -> TestContext {
    let guard = env_lock().await;
    set_test_env();

    let settings = Settings::load().expect("settings");
    let state = AppState::new(settings, Arc::new(backend));
    let app = api::router::router(state.clone());

    TestContext { state, app, _guard: guard }
}

/// Counts every backend call a [`StubBackend`] (and its scoped clones) receives.
#[derive(Debug, Default)]
pub(crate) struct CallLog {
    pub(crate) sessions: AtomicUsize,
    pub(crate) skills: AtomicUsize,
    pub(crate) profiles: AtomicUsize,
    pub(crate) disciplines: AtomicUsize,
    bearers: StdMutex<Vec<Option<String>>>,
    deleted: StdMutex<Vec<i64>>,
}

impl CallLog {
    /// Reference lookups only; result listings are not counted.
    pub(crate) fn total(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
            + self.skills.load(Ordering::SeqCst)
            + self.profiles.load(Ordering::SeqCst)
            + self.disciplines.load(Ordering::SeqCst)
    }

    pub(crate) fn bearers(&self) -> Vec<Option<String>> {
        self.bearers.lock().expect("bearers lock").clone()
    }

    pub(crate) fn deleted(&self) -> Vec<i64> {
        self.deleted.lock().expect("deleted lock").clone()
    }
}

/// In-memory [`ExamBackend`]. Unknown ids answer 404 like the real backend.
#[derive(Clone, Default)]
pub(crate) struct StubBackend {
    results: Vec<ExamResult>,
    sessions: HashMap<i64, Session>,
    skills: HashMap<i64, Skill>,
    disciplines: Vec<Discipline>,
    profiles: HashMap<i64, Profile>,
    failing_skills: HashSet<i64>,
    failing_disciplines: bool,
    skill_barrier: Option<Arc<Barrier>>,
    unreachable: bool,
    calls: Arc<CallLog>,
}

impl StubBackend {
    pub(crate) fn with_results(mut self, results: Vec<ExamResult>) -> Self {
        self.results.extend(results);
        self
    }

    pub(crate) fn with_session(mut self, id: i64, name: &str, roster: &[i64]) -> Self {
        self.sessions
            .insert(id, Session { name: name.to_string(), student_numbers: roster.to_vec() });
        self
    }

    pub(crate) fn with_skill(mut self, id: i64, name: &str, steps: &[(i64, bool)]) -> Self {
        let steps = steps
            .iter()
            .map(|&(id, mistake_possible)| SkillStep { id, mistake_possible })
            .collect();
        self.skills.insert(id, Skill { id, name: name.to_string(), steps });
        self
    }

    pub(crate) fn with_discipline(mut self, name: &str, skill_ids: &[i64]) -> Self {
        self.disciplines.push(Discipline {
            name: name.to_string(),
            skills: skill_ids.iter().map(|&id| DisciplineSkill { id }).collect(),
        });
        self
    }

    pub(crate) fn with_profile(mut self, id: i64, profile: Profile) -> Self {
        self.profiles.insert(id, profile);
        self
    }

    pub(crate) fn failing_skill(mut self, id: i64) -> Self {
        self.failing_skills.insert(id);
        self
    }

    pub(crate) fn failing_disciplines(mut self) -> Self {
        self.failing_disciplines = true;
        self
    }

    /// Every skill lookup blocks until `parties` of them are waiting.
    pub(crate) fn with_skill_barrier(mut self, parties: usize) -> Self {
        self.skill_barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub(crate) fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub(crate) fn calls(&self) -> Arc<CallLog> {
        self.calls.clone()
    }
}

fn not_found(entity: &str, id: i64) -> BackendError {
    BackendError::Status { status: 404, message: format!("{entity} {id} not found") }
}

#[async_trait]
impl ExamBackend for StubBackend {
    async fn exam_results(&self, session_id: Option<i64>) -> Result<Vec<ExamResult>, BackendError> {
        if self.unreachable {
            return Err(BackendError::Status { status: 503, message: "unavailable".to_string() });
        }
        Ok(self
            .results
            .iter()
            .filter(|result| session_id.map_or(true, |id| result.session_id == id))
            .cloned()
            .collect())
    }

    async fn session(&self, id: i64) -> Result<Session, BackendError> {
        self.calls.sessions.fetch_add(1, Ordering::SeqCst);
        self.sessions.get(&id).cloned().ok_or_else(|| not_found("Session", id))
    }

    async fn skill(&self, id: i64) -> Result<Skill, BackendError> {
        self.calls.skills.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.skill_barrier {
            barrier.wait().await;
        }
        if self.failing_skills.contains(&id) {
            return Err(BackendError::Status { status: 500, message: "skill lookup failed".into() });
        }
        self.skills.get(&id).cloned().ok_or_else(|| not_found("Skill", id))
    }

    async fn disciplines(&self) -> Result<Vec<Discipline>, BackendError> {
        self.calls.disciplines.fetch_add(1, Ordering::SeqCst);
        if self.failing_disciplines {
            return Err(BackendError::Status {
                status: 500,
                message: "discipline lookup failed".into(),
            });
        }
        Ok(self.disciplines.clone())
    }

    async fn profile(&self, teacher_id: i64) -> Result<Profile, BackendError> {
        self.calls.profiles.fetch_add(1, Ordering::SeqCst);
        self.profiles.get(&teacher_id).cloned().ok_or_else(|| not_found("Profile", teacher_id))
    }

    async fn delete_exam_result(&self, id: i64) -> Result<(), BackendError> {
        if !self.results.iter().any(|result| result.id == Some(id)) {
            return Err(not_found("Result", id));
        }
        self.calls.deleted.lock().expect("deleted lock").push(id);
        Ok(())
    }

    async fn health(&self) -> Result<(), BackendError> {
        if self.unreachable {
            return Err(BackendError::Status { status: 503, message: "unavailable".to_string() });
        }
        Ok(())
    }

    fn with_bearer(&self, bearer: Option<&str>) -> Arc<dyn ExamBackend> {
        self.calls.bearers.lock().expect("bearers lock").push(bearer.map(str::to_string));
        Arc::new(self.clone())
    }
}

pub(crate) fn exam_result(
    id: i64,
    session_id: i64,
    skill_id: i64,
    student_id: i64,
    teacher_id: Option<i64>,
    steps: &[(i64, i32)],
    result_date: &str,
) -> ExamResult {
    ExamResult {
        id: Some(id),
        session_id,
        skill_id,
        student_id,
        teacher_id,
        step_scores: steps.iter().map(|&(step_id, score)| StepScore { step_id, score }).collect(),
        result_date: parse_datetime_flexible(result_date).expect("result date"),
    }
}

pub(crate) fn enriched(student_id: i64, skill: &str, discipline: &str, score: u8) -> EnrichedResult {
    EnrichedResult {
        id: 0,
        session_name: "Session".to_string(),
        skill_name: skill.to_string(),
        discipline_name: discipline.to_string(),
        student_id,
        teacher_name: String::new(),
        score,
        result_date: OffsetDateTime::UNIX_EPOCH,
    }
}

pub(crate) fn json_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    builder.body(Body::empty()).expect("request body")
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}

pub(crate) async fn read_bytes(response: axum::response::Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.expect("response body").to_vec()
}
