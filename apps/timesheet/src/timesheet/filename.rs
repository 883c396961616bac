use crate::timesheet::filler::TimesheetHeader;

const DEFAULT_EMPLOYEE: &str = "Unnamed";
const DEFAULT_PAY_PERIOD: &str = "No_Date";

/// Replaces every character outside alphanumerics, space, `-`, `_` and `.`
/// with `_`.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `{employee}_{pay period}_Timesheet.xlsx`. Defaults apply only to absent
/// fields; an empty name stays empty.
pub fn export_filename(header: &TimesheetHeader) -> String {
    let employee = header.employee_name.as_deref().unwrap_or(DEFAULT_EMPLOYEE);
    let period = header.pay_period.as_deref().unwrap_or(DEFAULT_PAY_PERIOD);
    format!("{}_{}_Timesheet.xlsx", sanitize(employee), sanitize(period))
}
