//! Declarative description of the billing workbook template.
//!
//! The template is a JSON layout (labels, per-row formulas, totals) rather
//! than a binary workbook. It is read at startup from
//! `TIMESHEET_TEMPLATE_PATH`; the service ships no formulas of its own.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::timesheet::cells::{column_index, column_letter, Cell, CellRef, InvalidCellRef, Sheet};
use crate::timesheet::fields::{is_formula_column, DATA_ROW_END, DATA_ROW_START, TOTALS_ROW};

/// Placeholder replaced with the row number in per-row formulas.
const ROW_PLACEHOLDER: &str = "{row}";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed template: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidCell(#[from] InvalidCellRef),

    #[error("invalid column '{0}'")]
    InvalidColumn(String),

    #[error("row formula in column {0} would be overwritten by row data")]
    FormulaOnInputColumn(String),

    #[error("label at {0} lies inside the data row band")]
    LabelInRowBand(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateFile {
    sheet_name: String,
    #[serde(default)]
    labels: BTreeMap<String, String>,
    #[serde(default)]
    row_formulas: BTreeMap<String, String>,
    #[serde(default)]
    totals_columns: Vec<String>,
    #[serde(default)]
    column_widths: BTreeMap<String, f64>,
}

/// A validated template, ready to be stamped into a fresh [`Sheet`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimesheetTemplate {
    pub sheet_name: String,
    labels: Vec<(CellRef, String)>,
    row_formulas: Vec<(u16, String)>,
    totals_columns: Vec<u16>,
    column_widths: Vec<(u16, f64)>,
}

impl TimesheetTemplate {
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, TemplateError> {
        let file: TemplateFile = serde_json::from_str(raw)?;

        let labels = file
            .labels
            .into_iter()
            .map(|(cell, text)| {
                let at: CellRef = cell.parse()?;
                if (DATA_ROW_START..=DATA_ROW_END).contains(&at.row) {
                    return Err(TemplateError::LabelInRowBand(cell));
                }
                Ok((at, text))
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        let row_formulas = file
            .row_formulas
            .into_iter()
            .map(|(letters, formula)| {
                let col = parse_column(&letters)?;
                if !is_formula_column(col) {
                    return Err(TemplateError::FormulaOnInputColumn(letters));
                }
                Ok((col, formula))
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        let totals_columns = file
            .totals_columns
            .iter()
            .map(|letters| parse_column(letters))
            .collect::<Result<Vec<_>, TemplateError>>()?;

        let column_widths = file
            .column_widths
            .into_iter()
            .map(|(letters, width)| Ok((parse_column(&letters)?, width)))
            .collect::<Result<Vec<_>, TemplateError>>()?;

        Ok(Self {
            sheet_name: file.sheet_name,
            labels,
            row_formulas,
            totals_columns,
            column_widths,
        })
    }

    /// A new sheet holding the template's labels, per-row formulas for every
    /// row of the band, and the totals row.
    pub fn to_sheet(&self) -> Sheet {
        let mut sheet = Sheet::new(self.sheet_name.clone());

        for (at, text) in &self.labels {
            sheet.set(*at, Cell::text(text.clone()));
        }

        for row in DATA_ROW_START..=DATA_ROW_END {
            let row_text = row.to_string();
            for (col, formula) in &self.row_formulas {
                sheet.set(
                    CellRef::new(row, *col),
                    Cell::formula(formula.replace(ROW_PLACEHOLDER, &row_text)),
                );
            }
        }

        for col in &self.totals_columns {
            let letter = column_letter(*col);
            sheet.set(
                CellRef::new(TOTALS_ROW, *col),
                Cell::formula(format!(
                    "SUM({letter}{DATA_ROW_START}:{letter}{DATA_ROW_END})"
                )),
            );
        }

        for (col, width) in &self.column_widths {
            sheet.set_column_width(*col, *width);
        }

        sheet
    }
}

fn parse_column(letters: &str) -> Result<u16, TemplateError> {
    column_index(letters).ok_or_else(|| TemplateError::InvalidColumn(letters.to_string()))
}

/// Layout used by unit tests: one placeholder formula per formula column,
/// so preservation can be checked cell by cell.
#[cfg(test)]
pub(crate) const TEST_LAYOUT: &str = r#"{
    "sheetName": "Sheet1",
    "labels": {"A1": "Timesheet", "P2": "Employee:", "A97": "Totals"},
    "rowFormulas": {
        "E": "=N(D{row})",
        "Q": "=N(K{row})",
        "W": "=N(H{row})",
        "X": "=N(W{row})",
        "Y": "=N(N{row})",
        "Z": "=N(R{row})",
        "AA": "=N(V{row})",
        "AB": "=N(AA{row})",
        "AC": "=N(X{row})"
    },
    "totalsColumns": ["K", "AC"],
    "columnWidths": {"D": 22}
}"#;

#[cfg(test)]
pub(crate) fn test_template() -> TimesheetTemplate {
    TimesheetTemplate::from_json(TEST_LAYOUT).unwrap()
}
