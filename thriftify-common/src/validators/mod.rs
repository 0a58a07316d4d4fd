use chrono::NaiveDate;
use serde_json::Value;

pub const MAX_USERNAME_LENGTH: usize = 128;
pub const MAX_PASSWORD_LENGTH: usize = 512;
pub const MAX_PURPOSE_LENGTH: usize = 256;

#[derive(Debug)]
pub enum Validity {
    Valid,
    Invalid(&'static str),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        match &self {
            Validity::Valid => true,
            Validity::Invalid(_) => false,
        }
    }
}

pub fn validate_username(username: &str) -> Validity {
    if username.trim().is_empty() {
        return Validity::Invalid("Username cannot be empty.");
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Validity::Invalid("Username is too long.");
    }

    if username.chars().any(|c| c.is_control()) {
        return Validity::Invalid("Username cannot contain control characters.");
    }

    Validity::Valid
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

/// Reads a JSON number or a numeric string as a finite `f64`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if number.is_finite() {
        Some(number)
    } else {
        None
    }
}

/// Reads a whole, non-negative day count. Accepts `30`, `30.0`, and `"30"`.
pub fn coerce_day_count(value: &Value) -> Option<i32> {
    let days = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64()?;
                if f.fract() != 0.0 {
                    return None;
                }
                f as i64
            }
        },
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    if days < 0 {
        return None;
    }

    i32::try_from(days).ok()
}

/// Reads a JSON string, or the textual form of a number or boolean.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
