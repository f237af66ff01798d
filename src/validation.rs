use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::error::AppError;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex compiles")
});

/// Collects field errors; the first message recorded for a field wins
#[derive(Debug, Default)]
pub struct Validator {
    errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &HashMap<String, String> {
        &self.errors
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_valid() {
            return Ok(());
        }
        Err(AppError::validation("Validation failed").with_details(self.errors))
    }
}

pub fn required(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn min_length(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

pub fn max_length(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

pub fn in_range(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

pub fn validate_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Length bounds are checked against the trimmed value; `0` disables a bound.
pub fn validate_string(
    v: &mut Validator,
    field: &str,
    value: &str,
    is_required: bool,
    min: usize,
    max: usize,
) {
    if is_required {
        v.check(required(value), field, format!("{} is required", field));
    }

    let value = value.trim();
    if value.is_empty() {
        return;
    }
    if min > 0 {
        v.check(
            min_length(value, min),
            field,
            format!("{} must be at least {} characters long", field, min),
        );
    }
    if max > 0 {
        v.check(
            max_length(value, max),
            field,
            format!("{} must not be more than {} characters long", field, max),
        );
    }
}

/// Value must be one of `allowed`, compared after trimming
pub fn validate_one_of(v: &mut Validator, field: &str, value: &str, allowed: &[&str]) {
    let value = value.trim();
    if value.is_empty() {
        v.add_error(field, "Required");
    } else if !allowed.contains(&value) {
        v.add_error(field, format!("Must be one of: {}", allowed.join(", ")));
    }
}

pub fn validate_id(v: &mut Validator, field: &str, value: i32) {
    v.check(value > 0, field, "Required and must be greater than 0");
}
