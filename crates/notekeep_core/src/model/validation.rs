//! Field validation rules shared by the services.
//!
//! # Invariants
//! - Validation is pure; it never touches storage.
//! - Every rejection maps to `ServiceError::InvalidInput` at the engine boundary.

use crate::model::note::NewToDoItem;
use crate::model::timestamp::parse_timestamp;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:#[0-9A-Fa-f]{3}|#[0-9A-Fa-f]{6}|[A-Za-z]+)$").expect("valid color regex")
});
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Reasons a write request is rejected before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("note cannot have both content and todo_items")]
    ContentAndChecklist,
    #[error("todo item #{index} has blank content")]
    BlankTodoItem { index: usize },
    #[error("malformed color `{0}`")]
    MalformedColor(String),
    #[error("malformed {field} `{value}`; expected YYYY-MM-DD HH:MM:SS")]
    MalformedTimestamp { field: &'static str, value: String },
    #[error("event end_time is earlier than start_time")]
    EventEndsBeforeStart,
    #[error("tag name cannot be blank")]
    BlankTagName,
    #[error("username cannot be blank")]
    BlankUsername,
    #[error("malformed email `{0}`")]
    MalformedEmail(String),
    #[error("password hash cannot be blank")]
    BlankPasswordHash,
}

/// Enforces content-mode exclusivity for one write request.
///
/// Both sides may be empty. Both sides non-empty is rejected.
pub fn validate_body(content: &str, todo_items: &[NewToDoItem]) -> Result<(), ValidationError> {
    if !content.is_empty() && !todo_items.is_empty() {
        return Err(ValidationError::ContentAndChecklist);
    }
    validate_todo_items(todo_items)
}

pub fn validate_todo_items(todo_items: &[NewToDoItem]) -> Result<(), ValidationError> {
    match todo_items
        .iter()
        .position(|item| item.content.trim().is_empty())
    {
        Some(index) => Err(ValidationError::BlankTodoItem { index }),
        None => Ok(()),
    }
}

/// Accepts `""` (no color), `#rgb`, `#rrggbb` or a plain color word.
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    if color.is_empty() || COLOR_RE.is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::MalformedColor(color.to_string()))
    }
}

pub fn validate_timestamp(field: &'static str, value: &str) -> Result<(), ValidationError> {
    parse_timestamp(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::MalformedTimestamp {
            field,
            value: value.to_string(),
        })
}

pub fn validate_event_window(start_time: &str, end_time: &str) -> Result<(), ValidationError> {
    let start = parse_timestamp(start_time).ok_or_else(|| ValidationError::MalformedTimestamp {
        field: "start_time",
        value: start_time.to_string(),
    })?;
    let end = parse_timestamp(end_time).ok_or_else(|| ValidationError::MalformedTimestamp {
        field: "end_time",
        value: end_time.to_string(),
    })?;
    if end < start {
        return Err(ValidationError::EventEndsBeforeStart);
    }
    Ok(())
}

/// Trims a tag name and rejects blank input.
pub fn normalize_tag_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(ValidationError::BlankTagName)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        Err(ValidationError::BlankUsername)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();
    if EMAIL_RE.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::MalformedEmail(trimmed.to_string()))
    }
}

pub fn validate_password_hash(hash: &str) -> Result<(), ValidationError> {
    if hash.trim().is_empty() {
        Err(ValidationError::BlankPasswordHash)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(content: &str) -> NewToDoItem {
        NewToDoItem {
            content: content.to_string(),
            is_done: false,
        }
    }

    #[test]
    fn body_rejects_text_with_checklist() {
        let err = validate_body("buy milk", &[item("a")]).unwrap_err();
        assert_eq!(err, ValidationError::ContentAndChecklist);
    }

    #[test]
    fn body_accepts_either_mode_or_neither() {
        assert!(validate_body("buy milk", &[]).is_ok());
        assert!(validate_body("", &[item("a")]).is_ok());
        assert!(validate_body("", &[]).is_ok());
    }

    #[test]
    fn blank_todo_item_reports_its_index() {
        let err = validate_todo_items(&[item("a"), item("  ")]).unwrap_err();
        assert_eq!(err, ValidationError::BlankTodoItem { index: 1 });
    }

    #[test]
    fn color_accepts_hex_and_words() {
        for value in ["", "#fff", "#A1B2C3", "yellow"] {
            assert!(validate_color(value).is_ok(), "{value} should be accepted");
        }
        for value in ["#ff", "#12345g", "light blue", "rgb(0,0,0)"] {
            assert!(validate_color(value).is_err(), "{value} should be rejected");
        }
    }

    #[test]
    fn event_window_must_not_run_backwards() {
        assert!(validate_event_window("2024-05-01 10:00:00", "2024-05-01 10:00:00").is_ok());
        assert_eq!(
            validate_event_window("2024-05-01 10:00:00", "2024-05-01 09:00:00").unwrap_err(),
            ValidationError::EventEndsBeforeStart
        );
        assert!(matches!(
            validate_event_window("tomorrow", "2024-05-01 09:00:00").unwrap_err(),
            ValidationError::MalformedTimestamp {
                field: "start_time",
                ..
            }
        ));
    }

    #[test]
    fn tag_name_is_trimmed_and_must_not_be_blank() {
        assert_eq!(normalize_tag_name("  work ").unwrap(), "work");
        assert_eq!(
            normalize_tag_name("   ").unwrap_err(),
            ValidationError::BlankTagName
        );
    }

    #[test]
    fn email_shape_is_checked() {
        assert_eq!(normalize_email(" a@b.io ").unwrap(), "a@b.io");
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("a b@c.io").is_err());
    }
}
