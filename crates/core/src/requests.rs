//! Caller-supplied request shapes and their validation.
//!
//! Shape errors (wrong JSON types, missing fields) surface from serde;
//! content errors (empty or reserved identifiers, out-of-range numbers)
//! surface from `validator`. Both reach the caller as validation errors.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{Error, Result, ValidationErrorCode};
use crate::events::JsonObject;
use crate::limits::{
    FORBIDDEN_COUNTER_KEY_PATTERN, FORBIDDEN_IDENTIFIER_PATTERN, MAX_COUNTER_KEY_LEN,
    MAX_EVENT_FIELDS_BYTES, MAX_IDENTIFIER_LEN,
};

static FORBIDDEN_IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(FORBIDDEN_IDENTIFIER_PATTERN).expect("invalid identifier pattern")
});

static FORBIDDEN_COUNTER_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(FORBIDDEN_COUNTER_KEY_PATTERN).expect("invalid counter key pattern")
});

const CODE_REQUIRED: &str = "required";
const CODE_RESERVED: &str = "reserved_characters";
const CODE_TOO_LONG: &str = "too_long";

fn error_with_message(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates an agent id or event type used as a storage key segment.
fn validate_identifier(value: &str) -> std::result::Result<(), ValidationError> {
    if value.is_empty() {
        return Err(error_with_message(CODE_REQUIRED, "must not be empty".into()));
    }
    if value.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(error_with_message(
            CODE_TOO_LONG,
            format!("must be at most {MAX_IDENTIFIER_LEN} characters"),
        ));
    }
    if FORBIDDEN_IDENTIFIER_REGEX.is_match(value) {
        return Err(error_with_message(
            CODE_RESERVED,
            "must not contain ':', whitespace, or glob characters".into(),
        ));
    }
    Ok(())
}

fn validate_counter_key(value: &str) -> std::result::Result<(), ValidationError> {
    if value.is_empty() {
        return Err(error_with_message(CODE_REQUIRED, "must not be empty".into()));
    }
    if value.chars().count() > MAX_COUNTER_KEY_LEN {
        return Err(error_with_message(
            CODE_TOO_LONG,
            format!("must be at most {MAX_COUNTER_KEY_LEN} characters"),
        ));
    }
    if FORBIDDEN_COUNTER_KEY_REGEX.is_match(value) {
        return Err(error_with_message(
            CODE_RESERVED,
            "must not contain whitespace or glob characters".into(),
        ));
    }
    Ok(())
}

/// Validates the serialized size of a metrics or metadata object.
fn validate_fields_size(fields: &JsonObject) -> std::result::Result<(), ValidationError> {
    if fields.is_empty() {
        return Ok(());
    }

    let size = serde_json::to_vec(fields).map(|v| v.len()).unwrap_or(0);

    if size > MAX_EVENT_FIELDS_BYTES {
        return Err(error_with_message(
            "fields_too_large",
            format!(
                "{}KB exceeds {}KB limit",
                size / 1024,
                MAX_EVENT_FIELDS_BYTES / 1024
            ),
        ));
    }
    Ok(())
}

/// Input for recording an arbitrary event.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordEventRequest {
    #[validate(custom(function = "validate_identifier"))]
    pub agent_id: String,
    #[validate(custom(function = "validate_identifier"))]
    pub event_type: String,
    #[validate(custom(function = "validate_fields_size"))]
    pub metrics: JsonObject,
    #[validate(custom(function = "validate_fields_size"))]
    #[serde(default)]
    pub metadata: Option<JsonObject>,
}

/// Input for recording a completed call.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordCallRequest {
    #[validate(custom(function = "validate_identifier"))]
    pub agent_id: String,
    /// Call length in seconds.
    #[validate(range(min = 0.0))]
    pub duration: f64,
    pub successful: bool,
    pub appointment_scheduled: bool,
    /// 0-1 scale
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub call_quality: Option<f64>,
    #[validate(length(max = 256))]
    #[serde(default)]
    pub customer_id: Option<String>,
}

/// Input for incrementing a named counter.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IncrementCounterRequest {
    #[validate(custom(function = "validate_counter_key"))]
    pub counter_key: String,
    /// Signed amount; defaults to 1.
    #[serde(default)]
    pub increment: Option<i64>,
}

impl IncrementCounterRequest {
    pub fn amount(&self) -> i64 {
        self.increment.unwrap_or(1)
    }
}

/// Query for the raw events of one type for one agent.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetricsQuery {
    #[validate(custom(function = "validate_identifier"))]
    pub agent_id: String,
    #[validate(custom(function = "validate_identifier"))]
    pub event_type: String,
}

/// Query for one agent's call performance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformanceQuery {
    #[validate(custom(function = "validate_identifier"))]
    pub agent_id: String,
}

/// Runs `validator` checks and maps failures to a coded validation error.
pub fn validate_request<T: Validate>(request: &T) -> Result<()> {
    request.validate().map_err(into_validation_error)
}

fn into_validation_error(errors: ValidationErrors) -> Error {
    let mut details = Vec::new();
    let mut missing = false;
    let mut invalid_identifier = false;

    for (field, field_errors) in errors.field_errors() {
        for err in field_errors.iter() {
            match err.code.as_ref() {
                CODE_REQUIRED => missing = true,
                CODE_RESERVED | CODE_TOO_LONG => invalid_identifier = true,
                _ => {}
            }
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("failed {} check", err.code));
            details.push(format!("{}: {}", camel_case(field), message));
        }
    }
    details.sort();

    let code = if missing {
        ValidationErrorCode::MissingField
    } else if invalid_identifier {
        ValidationErrorCode::InvalidIdentifier
    } else {
        ValidationErrorCode::InvalidFormat
    };

    Error::validation_code(code, "Validation failed", details)
}

/// Field names in messages use the wire spelling.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Parses a JSON request body, mapping shape errors to a validation error.
pub fn parse_body<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        Error::validation_code(
            ValidationErrorCode::InvalidFormat,
            "Invalid request body",
            vec![e.to_string()],
        )
    })
}
