use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored movie record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub rating: i32,
    pub synopsis: String,
    pub year: i32,
    pub styles: Vec<String>,
    pub length: i32,
    pub trailer_link: String,
    pub realisators: Vec<String>,
    pub scenarists: Vec<String>,
    pub actors: Vec<String>,
    pub producers: Vec<String>,
}

/// Every field of a [`Movie`] a caller may supply; the id is always
/// assigned by the service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovieData {
    pub title: String,
    pub rating: i32,
    pub synopsis: String,
    pub year: i32,
    pub styles: Vec<String>,
    pub length: i32,
    pub trailer_link: String,
    pub realisators: Vec<String>,
    pub scenarists: Vec<String>,
    pub actors: Vec<String>,
    pub producers: Vec<String>,
}

/// Inbound body for create and update. Unknown keys (including `id`) are
/// ignored and missing keys fall back to their defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovieRequest {
    pub title: Option<String>,
    pub rating: i32,
    #[serde(alias = "sypnosis")]
    pub synopsis: String,
    pub year: Option<i32>,
    pub styles: Vec<String>,
    pub length: i32,
    pub trailer_link: String,
    pub realisators: Vec<String>,
    pub scenarists: Vec<String>,
    pub actors: Vec<String>,
    pub producers: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    pub id: Uuid,
    pub title: String,
    pub rating: i32,
    pub synopsis: String,
    pub year: i32,
    pub styles: Vec<String>,
    pub length: i32,
    pub trailer_link: String,
    pub realisators: Vec<String>,
    pub scenarists: Vec<String>,
    pub actors: Vec<String>,
    pub producers: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Uniform body for every failed request.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldViolation>,
}

impl ErrorResponse {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self { status_code, message: message.into(), timestamp: Timestamp::now(), errors: Vec::new() }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
