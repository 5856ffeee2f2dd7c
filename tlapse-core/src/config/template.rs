//! strftime-style date templates.
//!
//! Folder layouts and log timestamps are configured as strftime templates.
//! chrono panics when an invalid template is rendered through `to_string()`,
//! so templates are checked once at load and rendered through `write!`.

use crate::error::{CoreError, CoreResult};
use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;

/// Returns an error if `template` contains specifiers chrono cannot render.
pub fn validate_strftime(field: &str, template: &str) -> CoreResult<()> {
    if StrftimeItems::new(template).any(|item| matches!(item, Item::Error)) {
        return Err(CoreError::Config(format!(
            "{field} is not a valid strftime template: '{template}'"
        )));
    }
    Ok(())
}

/// Renders `date` with a strftime template.
pub fn format_date(date: NaiveDate, template: &str) -> CoreResult<String> {
    let mut rendered = String::new();
    write!(rendered, "{}", date.format(template)).map_err(|_| {
        CoreError::Config(format!("cannot render date with template '{template}'"))
    })?;
    Ok(rendered)
}
