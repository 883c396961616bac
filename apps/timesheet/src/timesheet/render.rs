use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::timesheet::cells::{Cell, CellValue, Sheet};

/// `NaiveDate::num_days_from_ce` of 1899-12-30, day zero of spreadsheet
/// serial dates.
const SERIAL_EPOCH_DAYS_FROM_CE: i32 = 693_594;

pub fn date_serial(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - SERIAL_EPOCH_DAYS_FROM_CE)
}

pub fn time_serial(time: NaiveTime) -> f64 {
    f64::from(time.num_seconds_from_midnight()) / 86_400.0
}

/// Serializes the sheet into a single-sheet `.xlsx` document.
pub fn render_workbook(sheet: &Sheet) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet.name.as_str())?;

    for (at, cell) in sheet.cells() {
        // Writer grid is 0-based.
        write_cell(worksheet, at.row - 1, at.col - 1, cell)?;
    }

    for (col, width) in sheet.column_widths() {
        worksheet.set_column_width(*col - 1, *width)?;
    }

    workbook.save_to_buffer()
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), XlsxError> {
    let format = cell.num_format.map(|f| Format::new().set_num_format(f));

    let serial = match &cell.value {
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s.as_str())?;
            return Ok(());
        }
        CellValue::Formula(f) => {
            worksheet.write_formula(row, col, f.as_str())?;
            return Ok(());
        }
        CellValue::Number(n) => *n,
        CellValue::Integer(n) => *n as f64,
        CellValue::Date(d) => date_serial(*d),
        CellValue::Time(t) => time_serial(*t),
    };

    match format {
        Some(format) => worksheet.write_number_with_format(row, col, serial, &format)?,
        None => worksheet.write_number(row, col, serial)?,
    };
    Ok(())
}
