//! Joins raw exam results against sessions, skills, disciplines and teacher
//! profiles.
//!
//! Foreign keys are deduplicated per batch and every distinct lookup is issued
//! concurrently; the join only runs once all of them have resolved. A single
//! failed lookup fails the whole batch, there is no partial table.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tokio::task::JoinSet;

use crate::backend::models::{Discipline, ExamResult, Skill};
use crate::backend::{BackendError, ExamBackend};
use crate::core::metrics;
use crate::services::scoring::{calculate_score, StepOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EnrichedResult {
    pub(crate) id: i64,
    pub(crate) session_name: String,
    pub(crate) skill_name: String,
    pub(crate) discipline_name: String,
    pub(crate) student_id: i64,
    pub(crate) teacher_name: String,
    pub(crate) score: u8,
    pub(crate) result_date: OffsetDateTime,
}

#[derive(Debug, Error)]
pub(crate) enum EnrichError {
    #[error("failed to resolve {entity} {id}: {source}")]
    Lookup {
        entity: &'static str,
        id: i64,
        #[source]
        source: BackendError,
    },
    #[error("failed to load {entity}: {source}")]
    Catalog {
        entity: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("lookup task aborted: {0}")]
    Aborted(String),
}

/// Scores and denormalises `raw`, newest attempt first.
pub(crate) async fn enrich(
    raw: Vec<ExamResult>,
    backend: Arc<dyn ExamBackend>,
) -> Result<Vec<EnrichedResult>, EnrichError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let session_ids: BTreeSet<i64> = raw.iter().map(|result| result.session_id).collect();
    let skill_ids: BTreeSet<i64> = raw.iter().map(|result| result.skill_id).collect();
    let teacher_ids: BTreeSet<i64> = raw.iter().filter_map(|result| result.teacher_id).collect();

    tracing::debug!(
        rows = raw.len(),
        sessions = session_ids.len(),
        skills = skill_ids.len(),
        teachers = teacher_ids.len(),
        "Resolving exam result references"
    );

    let disciplines = {
        let backend = backend.clone();
        async move {
            metrics::record_lookup("disciplines");
            backend.disciplines().await.map_err(|source| {
                metrics::record_enrich_failure("disciplines");
                tracing::error!(error = %source, "Failed to load disciplines");
                EnrichError::Catalog { entity: "disciplines", source }
            })
        }
    };

    let (sessions, skills, teachers, disciplines) = tokio::try_join!(
        fetch_each("session", session_ids, &backend, |backend, id| async move {
            backend.session(id).await.map(|session| session.name)
        }),
        fetch_each("skill", skill_ids, &backend, |backend, id| async move {
            backend.skill(id).await
        }),
        fetch_each("teacher", teacher_ids, &backend, |backend, id| async move {
            backend.profile(id).await.map(|profile| profile.full_name())
        }),
        disciplines,
    )?;

    let discipline_by_skill = index_disciplines(&disciplines);

    let mut enriched: Vec<EnrichedResult> = raw
        .into_iter()
        .map(|result| {
            let skill = skills.get(&result.skill_id);
            EnrichedResult {
                id: result.id.unwrap_or(0),
                session_name: sessions.get(&result.session_id).cloned().unwrap_or_default(),
                skill_name: skill.map(|skill| skill.name.clone()).unwrap_or_default(),
                discipline_name: skill
                    .and_then(|skill| discipline_by_skill.get(&skill.id))
                    .map(|name| name.to_string())
                    .unwrap_or_default(),
                student_id: result.student_id,
                teacher_name: result
                    .teacher_id
                    .and_then(|id| teachers.get(&id).cloned())
                    .unwrap_or_default(),
                score: score_result(&result, skill),
                result_date: result.result_date,
            }
        })
        .collect();

    enriched.sort_by(|a, b| b.result_date.cmp(&a.result_date));
    metrics::record_enriched_rows(enriched.len());

    Ok(enriched)
}

/// Applies the skill's step flags to the recorded step scores.
pub(crate) fn score_result(result: &ExamResult, skill: Option<&Skill>) -> u8 {
    let steps: Vec<StepOutcome> = result
        .step_scores
        .iter()
        .map(|step| {
            let mistake_possible = skill.is_some_and(|skill| skill.mistake_possible(step.step_id));
            StepOutcome::new(step.score, mistake_possible)
        })
        .collect();

    calculate_score(&steps)
}

/// `skill id -> discipline name`; a skill listed by several disciplines keeps the last one.
fn index_disciplines(disciplines: &[Discipline]) -> HashMap<i64, &str> {
    let mut index = HashMap::new();
    for discipline in disciplines {
        for skill in &discipline.skills {
            index.insert(skill.id, discipline.name.as_str());
        }
    }
    index
}

async fn fetch_each<T, F, Fut>(
    entity: &'static str,
    ids: BTreeSet<i64>,
    backend: &Arc<dyn ExamBackend>,
    fetch: F,
) -> Result<HashMap<i64, T>, EnrichError>
where
    T: Send + 'static,
    F: Fn(Arc<dyn ExamBackend>, i64) -> Fut,
    Fut: Future<Output = Result<T, BackendError>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for id in ids {
        metrics::record_lookup(entity);
        let lookup = fetch(backend.clone(), id);
        tasks.spawn(async move { (id, lookup.await) });
    }

    let mut resolved = HashMap::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let (id, outcome) = joined.map_err(|err| EnrichError::Aborted(err.to_string()))?;
        match outcome {
            Ok(value) => {
                resolved.insert(id, value);
            }
            Err(source) => {
                metrics::record_enrich_failure(entity);
                tracing::error!(error = %source, entity, id, "Exam result lookup failed");
                return Err(EnrichError::Lookup { entity, id, source });
            }
        }
    }

    Ok(resolved)
}
