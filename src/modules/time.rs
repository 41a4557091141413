use chrono::{format::StrftimeItems, Local};

pub fn current_time(format: &str) -> String {
    Local::now().format(format).to_string()
}

/// Rejects strftime strings chrono cannot render, which would otherwise
/// panic inside `to_string`.
pub fn is_valid_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, chrono::format::Item::Error))
}
