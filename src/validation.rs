use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;
use strum::IntoEnumIterator;
use tracing::warn;

use crate::shared::AppError;

const SPECIAL_CHARACTERS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
        .expect("email pattern is valid")
});

pub fn is_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && EMAIL_PATTERN.is_match(value)
}

fn has_uppercase_and_special(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| SPECIAL_CHARACTERS.contains(c))
}

/// Dotted field path, e.g. `Owners.0.Email`
pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Collects field issues while a request body is parsed.
///
/// Every rule on a field is evaluated, so one field can report several
/// issues; `finish` joins them as `"<path> - <message>"` separated by `", "`.
#[derive(Debug, Default)]
pub struct Validator {
    issues: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, path: &str, message: &str) {
        self.issues.push(format!("{} - {}", path, message));
    }

    /// Records `message` unless `ok` holds
    pub fn check(&mut self, path: &str, ok: bool, message: &str) -> bool {
        if !ok {
            self.issue(path, message);
        }
        ok
    }

    /// A string field that must be present; `missing` is reported when it is absent
    pub fn required_str(&mut self, object: &Value, prefix: &str, key: &str, missing: &str) -> Option<String> {
        let path = join_path(prefix, key);
        match object.get(key) {
            None | Some(Value::Null) => {
                self.issue(&path, missing);
                None
            }
            Some(Value::String(value)) => Some(value.clone()),
            Some(_) => {
                self.issue(&path, "Expected string");
                None
            }
        }
    }

    pub fn optional_str(&mut self, object: &Value, prefix: &str, key: &str) -> Option<String> {
        match object.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(value)) => Some(value.clone()),
            Some(_) => {
                self.issue(&join_path(prefix, key), "Expected string");
                None
            }
        }
    }

    pub fn array<'v>(&mut self, object: &'v Value, prefix: &str, key: &str) -> Option<&'v Vec<Value>> {
        let path = join_path(prefix, key);
        match object.get(key) {
            None | Some(Value::Null) => {
                self.issue(&path, "Required");
                None
            }
            Some(Value::Array(items)) => Some(items),
            Some(_) => {
                self.issue(&path, "Expected array");
                None
            }
        }
    }

    pub fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Value> {
        if value.is_object() {
            Some(value)
        } else {
            self.issue(path, "Expected object");
            None
        }
    }

    pub fn non_empty(&mut self, path: &str, value: &str, message: &str) -> bool {
        self.check(path, !value.is_empty(), message)
    }

    pub fn min_chars(&mut self, path: &str, value: &str, min: usize, message: &str) -> bool {
        self.check(path, value.chars().count() >= min, message)
    }

    pub fn max_chars(&mut self, path: &str, value: &str, max: usize, message: &str) -> bool {
        self.check(path, value.chars().count() <= max, message)
    }

    pub fn email(&mut self, path: &str, value: &str, message: &str) -> bool {
        self.check(path, is_email(value), message)
    }

    /// Password rules shared by signup and reset
    pub fn password_strength(&mut self, path: &str, value: &str) -> bool {
        let rules = [
            self.non_empty(path, value, "Password is required"),
            self.min_chars(path, value, 8, "Password must be more than 8 characters"),
            self.max_chars(path, value, 32, "Password must be less than 32 characters"),
            self.check(
                path,
                has_uppercase_and_special(value),
                "Password must contain at least one uppercase letter and one special character",
            ),
        ];
        rules.iter().all(|ok| *ok)
    }

    /// An enumerated string field; the message lists every accepted value
    pub fn one_of<T>(&mut self, object: &Value, prefix: &str, key: &str) -> Option<T>
    where
        T: FromStr + IntoEnumIterator + Display,
    {
        let path = join_path(prefix, key);
        let raw = match object.get(key) {
            None | Some(Value::Null) => {
                self.issue(&path, "Required");
                return None;
            }
            Some(value) => value,
        };

        match raw.as_str().map(T::from_str) {
            Some(Ok(value)) => Some(value),
            _ => {
                let expected = T::iter()
                    .map(|variant| format!("'{}'", variant))
                    .collect::<Vec<_>>()
                    .join(" | ");
                self.issue(&path, &format!("Invalid enum value. Expected {}", expected));
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            let message = self.issues.join(", ");
            warn!(issues = %message, "Request failed validation");
            Err(AppError::Validation(message))
        }
    }
}

/// Request shapes parsed from untyped JSON with field-level messages
pub trait FromBody: Sized {
    fn from_body(body: &Value) -> Result<Self, AppError>;
}

/// Any well-formed JSON, for bodies whose rules depend on the caller
impl FromBody for Value {
    fn from_body(body: &Value) -> Result<Self, AppError> {
        Ok(body.clone())
    }
}

/// Extractor that reads a JSON body and validates it into `T`
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: FromBody,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(error = %e, "Request body is not valid JSON");
            AppError::Validation(format!("Invalid JSON body: {}", e))
        })?;

        T::from_body(&body).map(ValidJson)
    }
}

/// Extractor that validates query parameters into `T` as if they were a JSON object
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: FromBody,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let object: Map<String, Value> = params
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        T::from_body(&Value::Object(object)).map(ValidQuery)
    }
}
