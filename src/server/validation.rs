//! Request validation for the Pokedex API.
//!
//! Every mutating endpoint declares its body as a [`Schema`]: a list of
//! [`FieldRule`]s naming each accepted field, its JSON type and whether it
//! must be present. [`check_fields`] interprets that description against the
//! raw JSON, so a body either becomes a typed payload or an enumerated list of
//! field-level violations. Unknown keys are violations, never dropped.
//!
//! Path and query scalars (`id`, `no`, `limit`) arrive as text and go through
//! [`parse_integer`] / [`parse_limit`].

use std::fmt;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::server::api_error::ApiError;

/// JSON type accepted for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// A JSON number without a fractional part.
    Integer,
    String,
}

impl FieldType {
    fn name(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::String => "string",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::Integer => value.as_i64().is_some(),
            FieldType::String => value.is_string(),
        }
    }
}

/// Declaration of one accepted body field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    /// Minimum length in characters, strings only.
    pub min_length: Option<usize>,
}

impl FieldRule {
    pub const fn required(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: true,
            min_length: None,
        }
    }

    pub const fn optional(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: false,
            min_length: None,
        }
    }

    pub const fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }
}

/// A request body described by field rules.
///
/// The implementing type should carry `#[serde(deny_unknown_fields)]` and
/// field names matching `FIELDS`, so deserialization after a clean check
/// cannot fail in practice.
pub trait Schema: DeserializeOwned {
    /// Human-readable subject used in the error message, e.g. `"trainer"`.
    const NAME: &'static str;
    const FIELDS: &'static [FieldRule];
}

/// Machine-readable kind of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    UnrecognizedKey,
    InvalidType,
    Required,
    TooSmall,
    InvalidJson,
    NotAnObject,
}

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub code: IssueCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result type for scalar validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_object(rules: &[FieldRule], object: &Map<String, Value>) -> Vec<ValidationError> {
    let mut issues = Vec::new();

    for key in object.keys() {
        if !rules.iter().any(|rule| rule.name == key) {
            issues.push(ValidationError::new(
                key.as_str(),
                IssueCode::UnrecognizedKey,
                format!("unrecognized key '{key}'"),
            ));
        }
    }

    for rule in rules {
        let Some(value) = object.get(rule.name) else {
            if rule.required {
                issues.push(ValidationError::new(
                    rule.name,
                    IssueCode::Required,
                    "is required",
                ));
            }
            continue;
        };

        if !rule.field_type.accepts(value) {
            issues.push(ValidationError::new(
                rule.name,
                IssueCode::InvalidType,
                format!(
                    "expected {}, received {}",
                    rule.field_type.name(),
                    json_type_name(value)
                ),
            ));
            continue;
        }

        if let (Some(min), Some(text)) = (rule.min_length, value.as_str()) {
            if text.chars().count() < min {
                issues.push(ValidationError::new(
                    rule.name,
                    IssueCode::TooSmall,
                    format!("must contain at least {min} character(s)"),
                ));
            }
        }
    }

    issues
}

/// Check a JSON body against a field list.
///
/// Returns every violation found; an empty list means the body is acceptable.
pub fn check_fields(rules: &[FieldRule], body: &Value) -> Vec<ValidationError> {
    match body {
        Value::Object(object) => check_object(rules, object),
        other => vec![ValidationError::new(
            "body",
            IssueCode::NotAnObject,
            format!("expected object, received {}", json_type_name(other)),
        )],
    }
}

/// Validate and convert a JSON body into its typed payload.
pub fn parse_payload<T: Schema>(body: Value) -> Result<T, Vec<ValidationError>> {
    let issues = check_fields(T::FIELDS, &body);
    if !issues.is_empty() {
        return Err(issues);
    }

    serde_json::from_value(body)
        .map_err(|e| vec![ValidationError::new("body", IssueCode::InvalidType, e.to_string())])
}

/// Parse a path or query scalar as an integer.
///
/// # Example
/// ```
/// use pokedex::server::validation::parse_integer;
///
/// assert_eq!(parse_integer("25", "id").unwrap(), 25);
/// assert!(parse_integer("pikachu", "id").is_err());
/// assert!(parse_integer("", "id").is_err());
/// ```
pub fn parse_integer(raw: &str, field_name: &str) -> ValidationResult<i64> {
    raw.parse::<i64>().map_err(|_| {
        ValidationError::new(
            field_name,
            IssueCode::InvalidType,
            format!("expected integer, received '{raw}'"),
        )
    })
}

/// Parse the `limit` query parameter.
///
/// A missing or empty value falls back to `default`. There is no upper cap.
///
/// # Example
/// ```
/// use pokedex::server::validation::parse_limit;
///
/// assert_eq!(parse_limit(None, 10).unwrap(), 10);
/// assert_eq!(parse_limit(Some("3"), 10).unwrap(), 3);
/// assert!(parse_limit(Some("-1"), 10).is_err());
/// ```
pub fn parse_limit(raw: Option<&str>, default: i64) -> ValidationResult<i64> {
    match raw {
        None | Some("") => Ok(default),
        Some(raw) => {
            let limit = parse_integer(raw, "limit")?;
            validate_min(limit, 0, "limit")?;
            Ok(limit)
        }
    }
}

/// Validate that an integer is at least `min`.
pub fn validate_min(value: i64, min: i64, field_name: &str) -> ValidationResult<()> {
    if value < min {
        Err(ValidationError::new(
            field_name,
            IssueCode::TooSmall,
            format!("must be greater than or equal to {min}"),
        ))
    } else {
        Ok(())
    }
}

/// JSON body extractor that enforces a [`Schema`].
///
/// Malformed JSON, a missing content type and schema violations are all
/// rejected with a 400 validation error before the handler runs.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: Schema + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ApiError::validation(
                    T::NAME,
                    vec![ValidationError::new(
                        "body",
                        IssueCode::InvalidJson,
                        rejection.body_text(),
                    )],
                )
            })?;

        parse_payload::<T>(body)
            .map(Payload)
            .map_err(|issues| ApiError::validation(T::NAME, issues))
    }
}
