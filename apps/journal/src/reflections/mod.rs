// Reflection journal: create/list/fetch/delete plus the rolling emotion trend.

pub mod handlers;
pub mod models;
pub mod trend;
pub mod validation;
