//! System-context framing shared by every provider.

use chrono::{Local, NaiveDate};

/// Human-readable date format, e.g. "Wednesday, January 01, 2025".
pub const DATE_FORMAT: &str = "%A, %B %d, %Y";

/// Append the given date to context instructions.
pub fn stamp_date(context_instructions: &str, date: NaiveDate) -> String {
    format!(
        "{}. The current date is {}",
        context_instructions,
        date.format(DATE_FORMAT)
    )
}

/// Append today's local date to context instructions.
pub fn stamp_current_date(context_instructions: &str) -> String {
    stamp_date(context_instructions, Local::now().date_naive())
}
