use serde::{Deserialize, Deserializer};
use time::OffsetDateTime;

use crate::core::time::deserialize_datetime_flexible;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StepScore {
    pub(crate) step_id: i64,
    pub(crate) score: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamResult {
    #[serde(default)]
    pub(crate) id: Option<i64>,
    pub(crate) session_id: i64,
    pub(crate) skill_id: i64,
    pub(crate) student_id: i64,
    #[serde(default)]
    pub(crate) teacher_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) step_scores: Vec<StepScore>,
    #[serde(deserialize_with = "deserialize_datetime_flexible")]
    pub(crate) result_date: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Session {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) student_numbers: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SkillStep {
    pub(crate) id: i64,
    #[serde(default)]
    pub(crate) mistake_possible: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Skill {
    pub(crate) id: i64,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) steps: Vec<SkillStep>,
}

impl Skill {
    pub(crate) fn mistake_possible(&self, step_id: i64) -> bool {
        self.steps.iter().any(|step| step.id == step_id && step.mistake_possible)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DisciplineSkill {
    pub(crate) id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Discipline {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) skills: Vec<DisciplineSkill>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Profile {
    #[serde(default)]
    pub(crate) first_name: Option<String>,
    #[serde(default)]
    pub(crate) second_name: Option<String>,
    #[serde(default)]
    pub(crate) father_name: Option<String>,
}

impl Profile {
    /// "First Second Father" with missing or blank parts left out.
    pub(crate) fn full_name(&self) -> String {
        [&self.first_name, &self.second_name, &self.father_name]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exam_result_reads_backend_payload() {
        let raw = json!({
            "id": 7,
            "sessionId": 2,
            "skillId": 11,
            "studentId": 1042,
            "teacherId": 5,
            "stepScores": [{"stepId": 1, "score": 2}, {"stepId": 2, "score": 0}],
            "resultDate": "2025-05-14T10:30:00"
        });

        let result: ExamResult = serde_json::from_value(raw).expect("exam result");
        assert_eq!(result.id, Some(7));
        assert_eq!(result.teacher_id, Some(5));
        assert_eq!(result.step_scores[1], StepScore { step_id: 2, score: 0 });
        assert_eq!(result.result_date.hour(), 10);
    }

    #[test]
    fn exam_result_tolerates_missing_optional_fields() {
        let raw = json!({
            "sessionId": 2,
            "skillId": 11,
            "studentId": 1042,
            "stepScores": null,
            "resultDate": "2025-05-14T10:30:00Z"
        });

        let result: ExamResult = serde_json::from_value(raw).expect("exam result");
        assert_eq!(result.id, None);
        assert_eq!(result.teacher_id, None);
        assert!(result.step_scores.is_empty());
    }

    #[test]
    fn discipline_with_null_skills_has_none() {
        let raw = json!({"id": 1, "name": "Surgery", "skills": null});
        let discipline: Discipline = serde_json::from_value(raw).expect("discipline");
        assert!(discipline.skills.is_empty());
    }

    #[test]
    fn skill_reports_mistake_possible_steps() {
        let raw = json!({
            "id": 3,
            "name": "Suturing",
            "steps": [
                {"id": 10, "name": "Gloves", "mistakePossible": false},
                {"id": 11, "name": "Knot", "mistakePossible": true}
            ]
        });
        let skill: Skill = serde_json::from_value(raw).expect("skill");
        assert!(skill.mistake_possible(11));
        assert!(!skill.mistake_possible(10));
        assert!(!skill.mistake_possible(99));
    }

    #[test]
    fn profile_full_name_trims_missing_parts() {
        let profile = Profile {
            first_name: Some("Anna".to_string()),
            second_name: Some("Petrova".to_string()),
            father_name: None,
        };
        assert_eq!(profile.full_name(), "Anna Petrova");
        assert_eq!(Profile::default().full_name(), "");
    }

    #[test]
    fn profile_full_name_skips_missing_middle_part() {
        let profile = Profile {
            first_name: Some("Anna".to_string()),
            second_name: None,
            father_name: Some("Sergeevna".to_string()),
        };
        assert_eq!(profile.full_name(), "Anna Sergeevna");

        let blank = Profile { second_name: Some("  ".to_string()), ..profile };
        assert_eq!(blank.full_name(), "Anna Sergeevna");
    }
}
