//! In-memory worksheet model.
//!
//! Coordinates are 1-based (`A1` is row 1, column 1) to match the template
//! layout; conversion to the writer's 0-based grid happens in `render`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Display format applied to date cells.
pub const DATE_DISPLAY_FORMAT: &str = "mm/dd/yy";
/// Display format applied to time cells.
pub const TIME_DISPLAY_FORMAT: &str = "h:mm";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.col), self.row)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid cell reference '{0}'")]
pub struct InvalidCellRef(pub String);

impl FromStr for CellRef {
    type Err = InvalidCellRef;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidCellRef(s.to_string());
        let split = s.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
        let (letters, digits) = s.split_at(split);
        let col = column_index(letters).ok_or_else(invalid)?;
        let row = digits.parse::<u32>().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }
        Ok(CellRef { row, col })
    }
}

/// 1 → "A", 26 → "Z", 27 → "AA".
pub fn column_letter(col: u16) -> String {
    let mut name = String::new();
    let mut n = col;

    while n > 0 {
        n -= 1;
        name.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }

    name
}

/// "A" → 1, "AC" → 29. Uppercase letters only.
pub fn column_index(letters: &str) -> Option<u16> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    letters.chars().try_fold(0u16, |acc, c| {
        c.is_ascii_uppercase()
            .then(|| acc * 26 + (c as u16 - 'A' as u16 + 1))
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Integer(i64),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Formula text without the leading `=`.
    Formula(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub num_format: Option<&'static str>,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::plain(CellValue::Text(value.into()))
    }

    pub fn number(value: f64) -> Self {
        Self::plain(CellValue::Number(value))
    }

    pub fn integer(value: i64) -> Self {
        Self::plain(CellValue::Integer(value))
    }

    pub fn formula(expr: impl Into<String>) -> Self {
        let expr = expr.into();
        let expr = expr.strip_prefix('=').map(str::to_string).unwrap_or(expr);
        Self::plain(CellValue::Formula(expr))
    }

    pub fn date(value: NaiveDate) -> Self {
        Self {
            value: CellValue::Date(value),
            num_format: Some(DATE_DISPLAY_FORMAT),
        }
    }

    pub fn time(value: NaiveTime) -> Self {
        Self {
            value: CellValue::Time(value),
            num_format: Some(TIME_DISPLAY_FORMAT),
        }
    }

    fn plain(value: CellValue) -> Self {
        Self {
            value,
            num_format: None,
        }
    }
}

/// A single worksheet: sparse cells plus column widths.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    cells: BTreeMap<CellRef, Cell>,
    column_widths: BTreeMap<u16, f64>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            column_widths: BTreeMap::new(),
        }
    }

    pub fn get(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&at)
    }

    pub fn set(&mut self, at: CellRef, cell: Cell) {
        self.cells.insert(at, cell);
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&CellRef, &Cell)> {
        self.cells.iter()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (&u16, &f64)> {
        self.column_widths.iter()
    }
}
