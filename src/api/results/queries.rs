use serde::Deserialize;
use validator::Validate;

use crate::services::pivot::StudentRange;
use crate::services::sorting::{SortColumn, SortDirection};

#[derive(Debug, Deserialize, Validate)]
pub(super) struct ListResultsQuery {
    #[serde(default, alias = "sessionId")]
    #[validate(range(min = 1, message = "session_id must be positive"))]
    pub(super) session_id: Option<i64>,
    #[serde(default)]
    pub(super) sort: Option<SortColumn>,
    #[serde(default)]
    pub(super) direction: SortDirection,
}

#[derive(Debug, Deserialize, Validate)]
pub(super) struct PivotQuery {
    #[serde(default, alias = "sessionId")]
    #[validate(range(min = 1, message = "session_id must be positive"))]
    pub(super) session_id: Option<i64>,
    #[serde(default)]
    pub(super) from: Option<i64>,
    #[serde(default)]
    pub(super) to: Option<i64>,
}

impl PivotQuery {
    pub(super) fn range(&self, bounds: Option<StudentRange>) -> Option<StudentRange> {
        resolve_range(self.from, self.to, bounds)
    }
}

/// Missing ends default to the bounds of the loaded rows.
fn resolve_range(
    from: Option<i64>,
    to: Option<i64>,
    bounds: Option<StudentRange>,
) -> Option<StudentRange> {
    match (from, to, bounds) {
        (None, None, _) => None,
        (Some(from), Some(to), _) => Some(StudentRange { from, to }),
        (from, to, Some(bounds)) => Some(StudentRange {
            from: from.unwrap_or(bounds.from),
            to: to.unwrap_or(bounds.to),
        }),
        (from, to, None) => Some(StudentRange {
            from: from.unwrap_or(i64::MIN),
            to: to.unwrap_or(i64::MAX),
        }),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(super) struct ExportQuery {
    #[serde(default, alias = "sessionId")]
    #[validate(range(min = 1, message = "session_id must be positive"))]
    pub(super) session_id: Option<i64>,
    #[serde(default)]
    pub(super) from: Option<i64>,
    #[serde(default)]
    pub(super) to: Option<i64>,
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "filename must be 1-200 characters"))]
    pub(super) filename: Option<String>,
}

impl ExportQuery {
    pub(super) fn range(&self, bounds: Option<StudentRange>) -> Option<StudentRange> {
        resolve_range(self.from, self.to, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(from: Option<i64>, to: Option<i64>) -> PivotQuery {
        PivotQuery { session_id: None, from, to }
    }

    #[test]
    fn range_defaults_missing_ends_to_bounds() {
        let bounds = Some(StudentRange { from: 3, to: 40 });

        assert_eq!(query(None, None).range(bounds), None);
        assert_eq!(query(Some(10), None).range(bounds), Some(StudentRange { from: 10, to: 40 }));
        assert_eq!(query(None, Some(20)).range(bounds), Some(StudentRange { from: 3, to: 20 }));
        assert_eq!(query(Some(9), Some(1)).range(bounds), Some(StudentRange { from: 9, to: 1 }));
    }

    #[test]
    fn session_id_must_be_positive() {
        let bad = PivotQuery { session_id: Some(0), from: None, to: None };
        assert!(bad.validate().is_err());
        assert!(query(None, None).validate().is_ok());
    }
}
