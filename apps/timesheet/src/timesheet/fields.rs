//! Fixed layout of the billing timesheet.

use crate::timesheet::cells::CellRef;

/// First data row of the row band.
pub const DATA_ROW_START: u32 = 9;
/// Last data row of the row band.
pub const DATA_ROW_END: u32 = 96;
/// Rows past this many are dropped.
pub const MAX_DATA_ROWS: usize = (DATA_ROW_END - DATA_ROW_START + 1) as usize;
/// Row holding the column totals, just below the band.
pub const TOTALS_ROW: u32 = 97;

/// Column whose lookup formula a supplied case number replaces.
pub const CASE_NUMBER_COLUMN: u16 = 5;

/// Columns carrying template formulas. Only [`CASE_NUMBER_COLUMN`] may be
/// written by row data.
pub const FORMULA_COLUMNS: [u16; 9] = [5, 17, 23, 24, 25, 26, 27, 28, 29];

/// Row field name → column (1-based). Columns 17 and 23–29 have no field.
pub const COLUMN_MAP: [(&str, u16); 21] = [
    ("serviceType", 1),
    ("serviceChoice", 2),
    ("travelComments", 3),
    ("clientName", 4),
    ("caseNumber", 5),
    ("dateOfService", 6),
    ("timeIn", 7),
    ("timeOut", 8),
    ("driveFrom", 9),
    ("driveTo", 10),
    ("miles", 11),
    ("staffName", 12),
    ("paidLeave", 13),
    ("paidHours", 14),
    ("meetingHours", 15),
    ("trainingHours", 16),
    ("driveNonBill", 18),
    ("docTime", 19),
    ("mileageAdj", 20),
    ("odometerStart", 21),
    ("odometerStop", 22),
];

const NUMERIC_FIELDS: [&str; 9] = [
    "miles",
    "paidHours",
    "meetingHours",
    "trainingHours",
    "driveNonBill",
    "docTime",
    "mileageAdj",
    "odometerStart",
    "odometerStop",
];

/// Header cells, in the order they are filled.
pub const HEADER_CELLS: [(HeaderField, CellRef); 5] = [
    (HeaderField::EmployeeName, CellRef { row: 2, col: 17 }),
    (HeaderField::SupervisorName, CellRef { row: 4, col: 17 }),
    (HeaderField::PayPeriod, CellRef { row: 6, col: 17 }),
    (HeaderField::EmployeeSignature, CellRef { row: 5, col: 19 }),
    (HeaderField::SupervisorSignature, CellRef { row: 6, col: 23 }),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    EmployeeName,
    SupervisorName,
    PayPeriod,
    EmployeeSignature,
    SupervisorSignature,
}

/// How a row field's raw text becomes a cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    CaseNumber,
    Date,
    Time,
    Numeric,
    Text,
}

pub fn field_kind(field: &str) -> FieldKind {
    match field {
        "caseNumber" => FieldKind::CaseNumber,
        "dateOfService" => FieldKind::Date,
        "timeIn" | "timeOut" => FieldKind::Time,
        f if NUMERIC_FIELDS.contains(&f) => FieldKind::Numeric,
        _ => FieldKind::Text,
    }
}

pub fn is_formula_column(col: u16) -> bool {
    FORMULA_COLUMNS.contains(&col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_band_holds_88_rows() {
        assert_eq!(MAX_DATA_ROWS, 88);
    }

    #[test]
    fn test_only_case_number_maps_onto_a_formula_column() {
        let on_formula: Vec<_> = COLUMN_MAP
            .iter()
            .filter(|(_, col)| is_formula_column(*col))
            .collect();
        assert_eq!(on_formula, vec![&("caseNumber", CASE_NUMBER_COLUMN)]);
    }

    #[test]
    fn test_columns_are_unique() {
        let mut cols: Vec<u16> = COLUMN_MAP.iter().map(|(_, c)| *c).collect();
        cols.sort_unstable();
        cols.dedup();
        assert_eq!(cols.len(), COLUMN_MAP.len());
    }

    #[test]
    fn test_field_kinds() {
        assert_eq!(field_kind("caseNumber"), FieldKind::CaseNumber);
        assert_eq!(field_kind("dateOfService"), FieldKind::Date);
        assert_eq!(field_kind("timeOut"), FieldKind::Time);
        assert_eq!(field_kind("odometerStop"), FieldKind::Numeric);
        assert_eq!(field_kind("paidLeave"), FieldKind::Text);
        assert_eq!(field_kind("clientName"), FieldKind::Text);
    }
}
