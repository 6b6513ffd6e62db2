use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::time::format_offset;
use crate::services::enrichment::EnrichedResult;
use crate::services::pivot::{DisciplineAggregate, PivotModel, StudentRange, StudentRow};
use crate::services::roster::{DisciplineBreakdown, StudentBreakdown};

#[derive(Debug, Serialize)]
pub(crate) struct ExamResultResponse {
    pub(crate) id: i64,
    pub(crate) session_name: String,
    pub(crate) skill_name: String,
    pub(crate) discipline_name: String,
    pub(crate) student_id: i64,
    pub(crate) teacher_name: String,
    pub(crate) score: u8,
    pub(crate) result_date: String,
}

impl From<EnrichedResult> for ExamResultResponse {
    fn from(row: EnrichedResult) -> Self {
        Self {
            id: row.id,
            session_name: row.session_name,
            skill_name: row.skill_name,
            discipline_name: row.discipline_name,
            student_id: row.student_id,
            teacher_name: row.teacher_name,
            score: row.score,
            result_date: format_offset(row.result_date),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SkillAverageResponse {
    pub(crate) name: String,
    pub(crate) average_score: u8,
}

#[derive(Debug, Serialize)]
pub(crate) struct DisciplineAverageResponse {
    pub(crate) name: String,
    pub(crate) average_score: u8,
    pub(crate) skills: Vec<SkillAverageResponse>,
}

impl From<DisciplineAggregate> for DisciplineAverageResponse {
    fn from(discipline: DisciplineAggregate) -> Self {
        Self {
            name: discipline.name,
            average_score: discipline.average_score,
            skills: discipline
                .skills
                .into_iter()
                .map(|skill| SkillAverageResponse {
                    name: skill.name,
                    average_score: skill.average_score,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentRowResponse {
    pub(crate) id: i64,
    /// `null` marks a skill the student has not attempted.
    pub(crate) scores: BTreeMap<String, Option<u8>>,
    pub(crate) average: u8,
}

impl From<StudentRow> for StudentRowResponse {
    fn from(row: StudentRow) -> Self {
        Self { id: row.id, scores: row.scores, average: row.average }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentRangeResponse {
    pub(crate) from: i64,
    pub(crate) to: i64,
}

impl From<StudentRange> for StudentRangeResponse {
    fn from(range: StudentRange) -> Self {
        Self { from: range.from, to: range.to }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PivotResponse {
    pub(crate) disciplines: Vec<DisciplineAverageResponse>,
    pub(crate) students: Vec<StudentRowResponse>,
    /// Lowest and highest student id in the unfiltered rows.
    pub(crate) bounds: Option<StudentRangeResponse>,
}

impl PivotResponse {
    pub(crate) fn new(pivot: PivotModel, bounds: Option<StudentRange>) -> Self {
        Self {
            disciplines: pivot.disciplines.into_iter().map(Into::into).collect(),
            students: pivot.students.into_iter().map(Into::into).collect(),
            bounds: bounds.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionStudentsResponse {
    pub(crate) session_id: i64,
    pub(crate) students: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PendingStudentsResponse {
    pub(crate) session_id: i64,
    pub(crate) skill_id: i64,
    pub(crate) students: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SkillScoreResponse {
    pub(crate) name: String,
    pub(crate) score: u8,
}

#[derive(Debug, Serialize)]
pub(crate) struct DisciplineBreakdownResponse {
    pub(crate) name: String,
    pub(crate) average_score: u8,
    pub(crate) skills: Vec<SkillScoreResponse>,
}

impl From<DisciplineBreakdown> for DisciplineBreakdownResponse {
    fn from(discipline: DisciplineBreakdown) -> Self {
        Self {
            name: discipline.name,
            average_score: discipline.average_score,
            skills: discipline
                .skills
                .into_iter()
                .map(|skill| SkillScoreResponse { name: skill.name, score: skill.score })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentBreakdownResponse {
    pub(crate) session_id: i64,
    pub(crate) student_id: i64,
    pub(crate) disciplines: Vec<DisciplineBreakdownResponse>,
}

impl StudentBreakdownResponse {
    pub(crate) fn new(session_id: i64, breakdown: StudentBreakdown) -> Self {
        Self {
            session_id,
            student_id: breakdown.student_id,
            disciplines: breakdown.disciplines.into_iter().map(Into::into).collect(),
        }
    }
}
