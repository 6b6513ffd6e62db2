use std::cmp::Ordering;

use serde::Deserialize;

use crate::services::enrichment::EnrichedResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SortColumn {
    Id,
    SessionName,
    SkillName,
    DisciplineName,
    StudentId,
    TeacherName,
    Score,
    ResultDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Stable sort of the result table by one column.
pub(crate) fn sort_results(rows: &mut [EnrichedResult], column: SortColumn, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = compare(a, b, column);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare(a: &EnrichedResult, b: &EnrichedResult, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Id => a.id.cmp(&b.id),
        SortColumn::SessionName => a.session_name.cmp(&b.session_name),
        SortColumn::SkillName => a.skill_name.cmp(&b.skill_name),
        SortColumn::DisciplineName => a.discipline_name.cmp(&b.discipline_name),
        SortColumn::StudentId => a.student_id.cmp(&b.student_id),
        SortColumn::TeacherName => a.teacher_name.cmp(&b.teacher_name),
        SortColumn::Score => a.score.cmp(&b.score),
        SortColumn::ResultDate => a.result_date.cmp(&b.result_date),
    }
}
