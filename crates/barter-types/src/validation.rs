//! Field-level checks for user-submitted ad and proposal data.

use serde::Serialize;
use thiserror::Error;

use crate::api::AdForm;
use crate::models::{Category, Condition};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const COMMENT_MAX_CHARS: usize = 200;
pub const IMAGE_MAX_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("invalid {}", field_list(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError { field, message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.field).collect()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// The mutable part of an ad after validation: trimmed text, parsed enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdFields {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub category: Category,
    pub condition: Condition,
}

impl AdForm {
    pub fn validate(&self) -> Result<AdFields, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = required_text(&mut errors, "title", &self.title, TITLE_MAX_CHARS);
        let description =
            required_text(&mut errors, "description", &self.description, DESCRIPTION_MAX_CHARS);

        let image = match self.image.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(uri) if uri.chars().count() > IMAGE_MAX_CHARS => {
                errors.add("image", format!("must be at most {IMAGE_MAX_CHARS} characters"));
                None
            }
            Some(uri) => Some(uri.to_string()),
        };

        let category = self.category.trim().parse::<Category>().map_err(|e| {
            errors.add("category", e.to_string());
        });
        let condition = self.condition.trim().parse::<Condition>().map_err(|e| {
            errors.add("condition", e.to_string());
        });

        match (category, condition) {
            (Ok(category), Ok(condition)) => errors.finish(AdFields {
                title,
                description,
                image,
                category,
                condition,
            }),
            _ => Err(errors),
        }
    }
}

/// Comments are optional but bounded.
pub fn validate_comment(comment: &str) -> Result<String, ValidationErrors> {
    let comment = comment.trim();
    if comment.chars().count() > COMMENT_MAX_CHARS {
        return Err(ValidationErrors::single(
            "comment",
            format!("must be at most {COMMENT_MAX_CHARS} characters"),
        ));
    }
    Ok(comment.to_string())
}

fn field_list(errors: &[FieldError]) -> String {
    errors.iter().map(|e| e.field).collect::<Vec<_>>().join(", ")
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    max: usize,
) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "this field is required");
    } else if value.chars().count() > max {
        errors.add(field, format!("must be at most {max} characters"));
    }
    value.to_string()
}
