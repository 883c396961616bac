use serde::Deserialize;
use serde_json::{Map, Value};

use crate::timesheet::cells::{Cell, CellRef, Sheet};
use crate::timesheet::coerce::{parse_date, parse_numeric, parse_time, scalar_text};
use crate::timesheet::fields::{
    field_kind, is_formula_column, FieldKind, HeaderField, CASE_NUMBER_COLUMN, COLUMN_MAP,
    DATA_ROW_START, HEADER_CELLS, MAX_DATA_ROWS,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetHeader {
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub supervisor_name: Option<String>,
    #[serde(default)]
    pub pay_period: Option<String>,
    #[serde(default)]
    pub employee_signature: Option<String>,
    #[serde(default)]
    pub supervisor_signature: Option<String>,
}

impl TimesheetHeader {
    fn get(&self, field: HeaderField) -> Option<&str> {
        let value = match field {
            HeaderField::EmployeeName => &self.employee_name,
            HeaderField::SupervisorName => &self.supervisor_name,
            HeaderField::PayPeriod => &self.pay_period,
            HeaderField::EmployeeSignature => &self.employee_signature,
            HeaderField::SupervisorSignature => &self.supervisor_signature,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Request body of the export endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimesheetPayload {
    #[serde(default)]
    pub header: TimesheetHeader,
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillSummary {
    pub rows_written: usize,
    pub rows_dropped: usize,
}

/// Writes the header and up to [`MAX_DATA_ROWS`] rows into `sheet`.
///
/// Cells the payload leaves empty keep whatever the template put there.
pub fn fill_timesheet(sheet: &mut Sheet, payload: &TimesheetPayload) -> FillSummary {
    fill_header(sheet, &payload.header);

    let rows_written = payload.rows.len().min(MAX_DATA_ROWS);
    for (offset, row) in payload.rows.iter().take(MAX_DATA_ROWS).enumerate() {
        fill_row(sheet, DATA_ROW_START + offset as u32, row);
    }

    FillSummary {
        rows_written,
        rows_dropped: payload.rows.len() - rows_written,
    }
}

fn fill_header(sheet: &mut Sheet, header: &TimesheetHeader) {
    for (field, at) in HEADER_CELLS {
        if let Some(value) = header.get(field) {
            sheet.set(at, Cell::text(value));
        }
    }
}

fn fill_row(sheet: &mut Sheet, row: u32, data: &Map<String, Value>) {
    for (field, col) in COLUMN_MAP {
        let Some(raw) = data.get(field).and_then(scalar_text) else {
            continue;
        };

        if col != CASE_NUMBER_COLUMN && is_formula_column(col) {
            continue;
        }

        if let Some(cell) = coerce_field(field_kind(field), raw) {
            sheet.set(CellRef::new(row, col), cell);
        }
    }
}

/// The cell for one field value, or `None` when the cell stays untouched.
fn coerce_field(kind: FieldKind, raw: String) -> Option<Cell> {
    match kind {
        // A hard value here replaces the client lookup formula.
        FieldKind::CaseNumber => Some(match parse_numeric(&raw) {
            Some(n) => Cell::integer(n.trunc() as i64),
            None => Cell::text(raw),
        }),
        FieldKind::Date => Some(parse_date(&raw).map(Cell::date).unwrap_or_else(|| Cell::text(raw))),
        FieldKind::Time => Some(parse_time(&raw).map(Cell::time).unwrap_or_else(|| Cell::text(raw))),
        FieldKind::Numeric => parse_numeric(&raw).map(Cell::number),
        FieldKind::Text => Some(Cell::text(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timesheet::cells::CellValue;
    use crate::timesheet::fields::{DATA_ROW_END, TOTALS_ROW};
    use crate::timesheet::template::test_template;
    use chrono::{NaiveDate, NaiveTime};
    use serde_json::json;

    fn payload(value: Value) -> TimesheetPayload {
        serde_json::from_value(value).unwrap()
    }

    fn template_sheet() -> Sheet {
        test_template().to_sheet()
    }

    fn at(sheet: &Sheet, cell: &str) -> Option<CellValue> {
        sheet.get(cell.parse().unwrap()).map(|c| c.value.clone())
    }

    #[test]
    fn test_fills_header_cells() {
        let mut sheet = template_sheet();
        fill_timesheet(
            &mut sheet,
            &payload(json!({
                "header": {
                    "employeeName": "Dana Smith",
                    "supervisorName": "Lee",
                    "payPeriod": "03/01-03/15",
                    "employeeSignature": "DS",
                    "supervisorSignature": ""
                }
            })),
        );
        assert_eq!(at(&sheet, "Q2"), Some(CellValue::Text("Dana Smith".into())));
        assert_eq!(at(&sheet, "Q4"), Some(CellValue::Text("Lee".into())));
        assert_eq!(at(&sheet, "Q6"), Some(CellValue::Text("03/01-03/15".into())));
        assert_eq!(at(&sheet, "S5"), Some(CellValue::Text("DS".into())));
        assert_eq!(at(&sheet, "W6"), None);
    }

    #[test]
    fn test_case_number_date_and_time_are_typed() {
        let mut sheet = template_sheet();
        fill_timesheet(
            &mut sheet,
            &payload(json!({
                "rows": [{
                    "caseNumber": "4521",
                    "dateOfService": "3/14/25",
                    "timeIn": "08:30",
                    "timeOut": "9:15"
                }]
            })),
        );

        assert_eq!(at(&sheet, "E9"), Some(CellValue::Integer(4521)));

        let date = sheet.get("F9".parse().unwrap()).unwrap();
        assert_eq!(
            date.value,
            CellValue::Date(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
        );
        assert_eq!(date.num_format, Some("mm/dd/yy"));

        let time_in = sheet.get("G9".parse().unwrap()).unwrap();
        assert_eq!(
            time_in.value,
            CellValue::Time(NaiveTime::from_hms_opt(8, 30, 0).unwrap())
        );
        assert_eq!(time_in.num_format, Some("h:mm"));
        assert_eq!(
            at(&sheet, "H9"),
            Some(CellValue::Time(NaiveTime::from_hms_opt(9, 15, 0).unwrap()))
        );
    }

    #[test]
    fn test_case_number_truncates_or_falls_back_to_text() {
        let mut sheet = template_sheet();
        fill_timesheet(
            &mut sheet,
            &payload(json!({
                "rows": [
                    {"caseNumber": 77.9},
                    {"caseNumber": "A-12"}
                ]
            })),
        );
        assert_eq!(at(&sheet, "E9"), Some(CellValue::Integer(77)));
        assert_eq!(at(&sheet, "E10"), Some(CellValue::Text("A-12".into())));
    }

    #[test]
    fn test_case_number_formula_kept_when_absent() {
        let mut sheet = template_sheet();
        fill_timesheet(
            &mut sheet,
            &payload(json!({"rows": [{"clientName": "Acme"}]})),
        );
        assert_eq!(at(&sheet, "D9"), Some(CellValue::Text("Acme".into())));
        assert!(matches!(at(&sheet, "E9"), Some(CellValue::Formula(_))));
    }

    #[test]
    fn test_unparseable_date_and_time_written_as_text() {
        let mut sheet = template_sheet();
        fill_timesheet(
            &mut sheet,
            &payload(json!({"rows": [{"dateOfService": "mid-March", "timeIn": "noon"}]})),
        );
        assert_eq!(at(&sheet, "F9"), Some(CellValue::Text("mid-March".into())));
        assert_eq!(at(&sheet, "G9"), Some(CellValue::Text("noon".into())));
    }

    #[test]
    fn test_numeric_fields() {
        let mut sheet = template_sheet();
        fill_timesheet(
            &mut sheet,
            &payload(json!({
                "rows": [{
                    "miles": "12.5",
                    "paidHours": 4,
                    "docTime": "n/a",
                    "odometerStart": ""
                }]
            })),
        );
        assert_eq!(at(&sheet, "K9"), Some(CellValue::Number(12.5)));
        assert_eq!(at(&sheet, "N9"), Some(CellValue::Number(4.0)));
        assert_eq!(at(&sheet, "S9"), None);
        assert_eq!(at(&sheet, "U9"), None);
    }

    #[test]
    fn test_empty_and_null_values_are_skipped() {
        let mut sheet = template_sheet();
        fill_timesheet(
            &mut sheet,
            &payload(json!({"rows": [{"serviceType": "", "staffName": null, "paidLeave": true}]})),
        );
        assert_eq!(at(&sheet, "A9"), None);
        assert_eq!(at(&sheet, "L9"), None);
        assert_eq!(at(&sheet, "M9"), Some(CellValue::Text("true".into())));
    }

    #[test]
    fn test_unknown_fields_ignored_and_formulas_survive() {
        let template = template_sheet();
        let mut sheet = template.clone();
        fill_timesheet(
            &mut sheet,
            &payload(json!({
                "rows": [{
                    "transportBillTime": "9",
                    "serviceHours": "3",
                    "Q": "1",
                    "miles": "4"
                }]
            })),
        );
        for cell in ["Q9", "W9", "X9", "Y9", "Z9", "AA9", "AB9", "AC9"] {
            let at_ref = cell.parse().unwrap();
            assert_eq!(sheet.get(at_ref), template.get(at_ref), "{cell}");
        }
    }

    #[test]
    fn test_rows_past_the_band_are_dropped() {
        let rows: Vec<Value> = (0..100)
            .map(|i| json!({"staffName": format!("staff-{i}"), "caseNumber": i}))
            .collect();
        let template = template_sheet();
        let mut sheet = template.clone();

        let summary = fill_timesheet(&mut sheet, &payload(json!({"rows": rows})));

        assert_eq!(
            summary,
            FillSummary {
                rows_written: 88,
                rows_dropped: 12
            }
        );
        assert_eq!(
            at(&sheet, &format!("L{DATA_ROW_END}")),
            Some(CellValue::Text("staff-87".into()))
        );
        assert_eq!(at(&sheet, &format!("L{TOTALS_ROW}")), None);
        assert_eq!(
            sheet.get(format!("K{TOTALS_ROW}").parse().unwrap()),
            template.get(format!("K{TOTALS_ROW}").parse().unwrap())
        );
        assert_eq!(sheet.get("Q96".parse().unwrap()), template.get("Q96".parse().unwrap()));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let mut sheet = template_sheet();
        let summary = fill_timesheet(&mut sheet, &payload(json!({})));
        assert_eq!(summary.rows_written, 0);
        assert_eq!(sheet, template_sheet());
    }
}
