// Timesheet domain: template layout, payload coercion, and workbook output
pub mod cells;
pub mod coerce;
pub mod fields;
pub mod filename;
pub mod filler;
pub mod handlers;
pub mod render;
pub mod template;

use thiserror::Error;
use tracing::{debug, warn};

use crate::timesheet::fields::MAX_DATA_ROWS;
use crate::timesheet::filename::export_filename;
use crate::timesheet::filler::{fill_timesheet, TimesheetPayload};
use crate::timesheet::template::TimesheetTemplate;

#[derive(Debug, Error)]
pub enum FillError {
    /// Not JSON at all: syntax errors, truncation, trailing data.
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// Well-formed JSON of the wrong shape. Carries the path to the offending
    /// field, e.g. `rows[1]` or `header.employeeName`.
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_path_to_error::Error<serde_json::Error>),

    #[error("failed to write workbook: {0}")]
    Render(#[from] rust_xlsxwriter::XlsxError),
}

/// A finished document ready to be sent as a download.
#[derive(Debug)]
pub struct ExportedTimesheet {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Parses `body`, fills a fresh copy of the template and renders it.
pub fn export_timesheet(
    template: &TimesheetTemplate,
    body: &[u8],
) -> Result<ExportedTimesheet, FillError> {
    let payload = parse_payload(body)?;

    let mut sheet = template.to_sheet();
    let summary = fill_timesheet(&mut sheet, &payload);
    if summary.rows_dropped > 0 {
        warn!(
            "Dropped {} timesheet rows past the {}-row band",
            summary.rows_dropped, MAX_DATA_ROWS
        );
    }

    let bytes = render::render_workbook(&sheet)?;
    let filename = export_filename(&payload.header);
    debug!(
        "Rendered {filename} ({} rows, {} bytes)",
        summary.rows_written,
        bytes.len()
    );

    Ok(ExportedTimesheet { filename, bytes })
}

fn parse_payload(body: &[u8]) -> Result<TimesheetPayload, FillError> {
    let mut de = serde_json::Deserializer::from_slice(body);
    let payload: TimesheetPayload = serde_path_to_error::deserialize(&mut de)?;
    de.end()?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::timesheet::template::test_template;

    fn payload_message(body: &[u8]) -> String {
        match export_timesheet(&test_template(), body).unwrap_err() {
            FillError::Payload(e) => e.to_string(),
            other => panic!("expected a payload error, got {other:?}"),
        }
    }

    #[test]
    fn test_export_builds_filename_and_document() {
        let template = test_template();
        let body = br#"{"header": {"employeeName": "Dana", "payPeriod": "March"}, "rows": []}"#;
        let exported = export_timesheet(&template, body).unwrap();
        assert_eq!(exported.filename, "Dana_March_Timesheet.xlsx");
        assert!(!exported.bytes.is_empty());
    }

    #[test]
    fn test_export_rejects_malformed_json() {
        let template = test_template();
        let err = export_timesheet(&template, b"{not json").unwrap_err();
        assert!(matches!(err, FillError::Payload(ref e) if e.inner().is_syntax()), "{err:?}");

        let err = export_timesheet(&template, br#"{"rows": []} trailing"#).unwrap_err();
        assert!(matches!(err, FillError::Syntax(_)), "{err:?}");
    }

    #[test]
    fn test_shape_errors_name_the_field() {
        let message = payload_message(br#"{"rows": [{"miles": 1}, 5]}"#);
        assert!(message.starts_with("rows[1]: "), "{message}");

        let message = payload_message(br#"{"header": {"employeeName": 42}}"#);
        assert!(message.starts_with("header.employeeName: "), "{message}");
    }
}
