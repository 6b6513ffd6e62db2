//! Session roster views: who still has to be examined on a skill, and a
//! per-student breakdown of what has been recorded so far.

use std::collections::HashSet;

use crate::backend::models::ExamResult;
use crate::services::enrichment::EnrichedResult;
use crate::services::scoring::average;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SkillScore {
    pub(crate) name: String,
    pub(crate) score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DisciplineBreakdown {
    pub(crate) name: String,
    pub(crate) average_score: u8,
    pub(crate) skills: Vec<SkillScore>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StudentBreakdown {
    pub(crate) student_id: i64,
    pub(crate) disciplines: Vec<DisciplineBreakdown>,
}

/// Roster members, in roster order, with no recorded attempt at `skill_id`.
pub(crate) fn pending_students(roster: &[i64], results: &[ExamResult], skill_id: i64) -> Vec<i64> {
    let examined: HashSet<i64> = results
        .iter()
        .filter(|result| result.skill_id == skill_id)
        .map(|result| result.student_id)
        .collect();

    roster.iter().copied().filter(|student| !examined.contains(student)).collect()
}

/// Roster members, in roster order, that have at least one result.
pub(crate) fn students_with_results(roster: &[i64], results: &[EnrichedResult]) -> Vec<i64> {
    let seen: HashSet<i64> = results.iter().map(|row| row.student_id).collect();
    roster.iter().copied().filter(|student| seen.contains(student)).collect()
}

/// Groups one student's rows by discipline in order of first appearance.
/// Each skill shows its most recent score; the discipline average covers
/// every attempt.
pub(crate) fn student_breakdown(results: &[EnrichedResult], student_id: i64) -> StudentBreakdown {
    let mut groups: Vec<(&str, Vec<&EnrichedResult>)> = Vec::new();
    for row in results.iter().filter(|row| row.student_id == student_id) {
        match groups.iter_mut().find(|(name, _)| *name == row.discipline_name) {
            Some((_, rows)) => rows.push(row),
            None => groups.push((row.discipline_name.as_str(), vec![row])),
        }
    }

    let disciplines = groups
        .into_iter()
        .map(|(name, rows)| {
            let mut skills: Vec<SkillScore> = Vec::new();
            for row in &rows {
                if !skills.iter().any(|skill| skill.name == row.skill_name) {
                    skills.push(SkillScore { name: row.skill_name.clone(), score: row.score });
                }
            }

            DisciplineBreakdown {
                name: name.to_string(),
                average_score: average(rows.iter().map(|row| row.score)),
                skills,
            }
        })
        .collect();

    StudentBreakdown { student_id, disciplines }
}
