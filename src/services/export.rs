//! Spreadsheet export of the pivot: two header rows (disciplines over
//! skills) followed by one row per student.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use thiserror::Error;

use crate::services::pivot::PivotModel;

const SHEET_NAME: &str = "Студенты";
const STUDENT_HEADER: &str = "Студент";
const AVERAGE_HEADER: &str = "Среднее по студенту";
const ABSENT: &str = "-";
const COLUMN_WIDTH: f64 = 15.0;

#[derive(Debug, Error)]
pub(crate) enum ExportError {
    #[error("failed to write workbook: {0}")]
    Workbook(#[from] XlsxError),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SheetCell {
    Text(String),
    Number(f64),
}

impl SheetCell {
    fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Discipline header spanning `first_col..=last_col` of the first row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HeaderSpan {
    pub(crate) label: String,
    pub(crate) first_col: u16,
    pub(crate) last_col: u16,
}

impl HeaderSpan {
    pub(crate) fn is_merged(&self) -> bool {
        self.last_col > self.first_col
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SheetLayout {
    pub(crate) discipline_headers: Vec<HeaderSpan>,
    pub(crate) skill_headers: Vec<String>,
    pub(crate) rows: Vec<Vec<SheetCell>>,
}

impl SheetLayout {
    pub(crate) fn from_pivot(pivot: &PivotModel) -> Self {
        let mut discipline_headers = Vec::with_capacity(pivot.disciplines.len());
        let mut skill_headers = vec![STUDENT_HEADER.to_string()];
        let mut col: u16 = 1;

        for discipline in &pivot.disciplines {
            let span = discipline.skills.len().max(1) as u16;
            discipline_headers.push(HeaderSpan {
                label: format!("{} ({}%)", discipline.name, discipline.average_score),
                first_col: col,
                last_col: col + span - 1,
            });
            if discipline.skills.is_empty() {
                skill_headers.push(String::new());
            }
            for skill in &discipline.skills {
                skill_headers.push(format!("{} ({}%)", skill.name, skill.average_score));
            }
            col += span;
        }
        skill_headers.push(AVERAGE_HEADER.to_string());

        let rows = pivot
            .students
            .iter()
            .map(|student| {
                let mut row = vec![SheetCell::Number(student.id as f64)];
                for discipline in &pivot.disciplines {
                    if discipline.skills.is_empty() {
                        row.push(SheetCell::text(ABSENT));
                    }
                    for skill in &discipline.skills {
                        row.push(match student.score(&skill.name) {
                            Some(score) => SheetCell::Number(f64::from(score)),
                            None => SheetCell::text(ABSENT),
                        });
                    }
                }
                row.push(SheetCell::Number(f64::from(student.average)));
                row
            })
            .collect();

        Self { discipline_headers, skill_headers, rows }
    }

    pub(crate) fn column_count(&self) -> u16 {
        self.skill_headers.len() as u16
    }
}

/// Renders the layout into `.xlsx` bytes.
pub(crate) fn write_xlsx(layout: &SheetLayout) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(SHEET_NAME)?;

    let plain = Format::new();
    for header in &layout.discipline_headers {
        if header.is_merged() {
            worksheet.merge_range(0, header.first_col, 0, header.last_col, &header.label, &plain)?;
        } else {
            worksheet.write_string(0, header.first_col, &header.label)?;
        }
    }

    for (col, header) in layout.skill_headers.iter().enumerate() {
        worksheet.write_string(1, col as u16, header)?;
    }

    for (index, row) in layout.rows.iter().enumerate() {
        let row_num = index as u32 + 2;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                SheetCell::Text(value) => worksheet.write_string(row_num, col as u16, value)?,
                SheetCell::Number(value) => worksheet.write_number(row_num, col as u16, *value)?,
            };
        }
    }

    for col in 0..layout.column_count() {
        worksheet.set_column_width(col, COLUMN_WIDTH)?;
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;
    tracing::debug!(bytes = buffer.len(), students = layout.rows.len(), "Workbook rendered");
    Ok(buffer)
}
