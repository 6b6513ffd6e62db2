//! Discipline → skill → student pivot over enriched results.
//!
//! Everything here is a pure function of the rows it is given; changing the
//! student range means calling [`build_pivot`] again over the same rows.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::services::enrichment::EnrichedResult;
use crate::services::scoring::average;

/// Inclusive student id window. `from > to` selects nobody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StudentRange {
    pub(crate) from: i64,
    pub(crate) to: i64,
}

impl StudentRange {
    pub(crate) fn contains(&self, student_id: i64) -> bool {
        self.from <= student_id && student_id <= self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SkillAggregate {
    pub(crate) name: String,
    pub(crate) average_score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DisciplineAggregate {
    pub(crate) name: String,
    pub(crate) average_score: u8,
    pub(crate) skills: Vec<SkillAggregate>,
}

/// One pivot row. `scores` has an entry for every skill column; `None` marks
/// a skill the student has not attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StudentRow {
    pub(crate) id: i64,
    pub(crate) scores: BTreeMap<String, Option<u8>>,
    pub(crate) average: u8,
}

impl StudentRow {
    pub(crate) fn score(&self, skill_name: &str) -> Option<u8> {
        self.scores.get(skill_name).copied().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PivotModel {
    pub(crate) disciplines: Vec<DisciplineAggregate>,
    pub(crate) students: Vec<StudentRow>,
}

pub(crate) fn build_pivot(results: &[EnrichedResult], range: Option<StudentRange>) -> PivotModel {
    let rows: Vec<&EnrichedResult> = results
        .iter()
        .filter(|row| range.map_or(true, |range| range.contains(row.student_id)))
        .collect();

    if rows.is_empty() {
        return PivotModel::default();
    }

    let mut by_discipline: BTreeMap<&str, Vec<&EnrichedResult>> = BTreeMap::new();
    for row in rows.iter().copied() {
        by_discipline.entry(row.discipline_name.as_str()).or_default().push(row);
    }

    let disciplines: Vec<DisciplineAggregate> = by_discipline
        .into_iter()
        .map(|(name, discipline_rows)| {
            let mut by_skill: BTreeMap<&str, Vec<u8>> = BTreeMap::new();
            for row in &discipline_rows {
                by_skill.entry(row.skill_name.as_str()).or_default().push(row.score);
            }

            DisciplineAggregate {
                name: name.to_string(),
                average_score: average(discipline_rows.iter().map(|row| row.score)),
                skills: by_skill
                    .into_iter()
                    .map(|(skill, scores)| SkillAggregate {
                        name: skill.to_string(),
                        average_score: average(scores),
                    })
                    .collect(),
            }
        })
        .collect();

    let skill_columns: BTreeSet<&str> = rows.iter().map(|row| row.skill_name.as_str()).collect();

    let mut by_student: BTreeMap<i64, Vec<&EnrichedResult>> = BTreeMap::new();
    for row in rows.iter().copied() {
        by_student.entry(row.student_id).or_default().push(row);
    }

    let students = by_student
        .into_iter()
        .map(|(id, student_rows)| {
            let mut scores: BTreeMap<String, Option<u8>> =
                skill_columns.iter().map(|skill| (skill.to_string(), None)).collect();
            // Rows arrive newest first, so the first score per skill wins.
            for row in &student_rows {
                let cell = scores.entry(row.skill_name.clone()).or_insert(None);
                if cell.is_none() {
                    *cell = Some(row.score);
                }
            }

            StudentRow { id, scores, average: average(student_rows.iter().map(|row| row.score)) }
        })
        .collect();

    PivotModel { disciplines, students }
}

/// Keeps only rows for students on the session roster.
pub(crate) fn restrict_to_roster(results: Vec<EnrichedResult>, roster: &[i64]) -> Vec<EnrichedResult> {
    let roster: HashSet<i64> = roster.iter().copied().collect();
    results.into_iter().filter(|row| roster.contains(&row.student_id)).collect()
}

/// Smallest and largest student id present, the default filter window.
pub(crate) fn student_bounds(results: &[EnrichedResult]) -> Option<StudentRange> {
    let from = results.iter().map(|row| row.student_id).min()?;
    let to = results.iter().map(|row| row.student_id).max()?;
    Some(StudentRange { from, to })
}
