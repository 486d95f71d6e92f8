use crate::models::{FieldViolation, MovieRequest};

pub const TITLE_MAX_CHARS: usize = 200;
pub const SYNOPSIS_MAX_CHARS: usize = 1000;
pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 0..=10;
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1930..=2030;

#[derive(Clone, Debug, Default, PartialEq, thiserror::Error)]
#[error("one or more validation errors occurred")]
pub struct ValidationErrors(pub Vec<FieldViolation>);

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self(vec![FieldViolation { field: field.to_string(), message: message.into() }])
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldViolation { field: field.to_string(), message: message.into() });
    }
}

/// Checks the shape of an inbound movie before it reaches the service.
pub fn validate(req: &MovieRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    match req.title.as_deref() {
        Some(title) if !title.trim().is_empty() => {
            if title.chars().count() > TITLE_MAX_CHARS {
                errors.push(
                    "title",
                    format!("The field Title must be a string with a maximum length of {TITLE_MAX_CHARS}."),
                );
            }
        },
        _ => errors.push("title", "The Title field is required."),
    }

    if !RATING_RANGE.contains(&req.rating) {
        errors.push("rating", "Rating must be between 0 and 10");
    }

    if req.synopsis.chars().count() > SYNOPSIS_MAX_CHARS {
        errors.push(
            "synopsis",
            format!("The field Synopsis must be a string with a maximum length of {SYNOPSIS_MAX_CHARS}."),
        );
    }

    match req.year {
        None => errors.push("year", "The Year field is required."),
        Some(year) if !YEAR_RANGE.contains(&year) => errors.push("year", "Year must be realistic"),
        Some(_) => {},
    }

    if errors.0.is_empty() { Ok(()) } else { Err(errors) }
}
