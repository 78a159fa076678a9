// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Validation of recipe options.
//!
//! A recipe reports every problem with its options at once through
//! [`Validated`]; the runner refuses to run a recipe that is not valid.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use rewrite_core::RewriteError;
use thiserror::Error;

use crate::parser::is_reserved;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Error for a malformed name.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

fn invalid(name: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Validate a simple identifier such as a field or method name.
///
/// ```
/// use rewrite_java::validation::validate_identifier;
///
/// assert!(validate_identifier("count").is_ok());
/// assert!(validate_identifier("$tmp").is_ok());
/// assert!(validate_identifier("").is_err());
/// assert!(validate_identifier("2x").is_err());
/// assert!(validate_identifier("class").is_err());
/// ```
pub fn validate_identifier(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(invalid(name, "name cannot be empty"));
    }
    if !IDENTIFIER.is_match(name) {
        return Err(invalid(
            name,
            "must be a letter, '_' or '$' followed by letters, digits, '_' or '$'",
        ));
    }
    if is_reserved(name) {
        return Err(invalid(name, "cannot be a keyword"));
    }
    Ok(())
}

/// Validate a fully qualified class name such as `java.util.Map` or
/// `a.Outer$Inner`.
pub fn validate_class_name(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(invalid(name, "name cannot be empty"));
    }
    for segment in name.split(['.', '$']) {
        if segment.is_empty() {
            return Err(invalid(name, "contains an empty segment"));
        }
        validate_identifier(segment).map_err(|_| invalid(name, "segment is not an identifier"))?;
    }
    Ok(())
}

/// One invalid option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub property: String,
    pub message: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.message)
    }
}

/// The outcome of validating a set of options.
///
/// ```
/// use rewrite_java::validation::Validated;
///
/// let v = Validated::valid()
///     .and(Validated::required("field", Some("count")))
///     .and(Validated::required("class", None));
/// assert!(!v.is_valid());
/// assert_eq!(v.failures()[0].property, "class");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct Validated {
    failures: Vec<ValidationFailure>,
}

impl Validated {
    pub fn valid() -> Self {
        Validated::default()
    }

    pub fn invalid(property: &str, message: impl Into<String>) -> Self {
        Validated {
            failures: vec![ValidationFailure {
                property: property.to_string(),
                message: message.into(),
            }],
        }
    }

    /// Fails if `value` is missing or blank.
    pub fn required(property: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => Validated::valid(),
            _ => Validated::invalid(property, "is required"),
        }
    }

    /// Fails if `value` is not a simple identifier.
    pub fn identifier(property: &str, value: &str) -> Self {
        match validate_identifier(value) {
            Ok(()) => Validated::valid(),
            Err(err) => Validated::invalid(property, err.to_string()),
        }
    }

    /// Fails if `value` is not a fully qualified class name.
    pub fn class_name(property: &str, value: &str) -> Self {
        match validate_class_name(value) {
            Ok(()) => Validated::valid(),
            Err(err) => Validated::invalid(property, err.to_string()),
        }
    }

    /// Both sets of failures.
    pub fn and(mut self, other: Validated) -> Self {
        self.failures.extend(other.failures);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// An `InvalidArguments` error naming `recipe` and every failure.
    pub fn into_result(self, recipe: &str) -> Result<(), RewriteError> {
        if self.is_valid() {
            return Ok(());
        }
        let details = serde_json::Value::Array(
            self.failures
                .iter()
                .map(|f| serde_json::json!({ "property": f.property, "message": f.message }))
                .collect(),
        );
        let listed: Vec<String> = self.failures.iter().map(|f| f.to_string()).collect();
        Err(RewriteError::invalid_args_with_details(
            format!("{} has invalid options: {}", recipe, listed.join("; ")),
            details,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewrite_core::OutputErrorCode;

    mod names {
        use super::*;

        #[test]
        fn identifiers() {
            assert!(validate_identifier("total").is_ok());
            assert!(validate_identifier("_x1").is_ok());
            assert!(validate_identifier("a-b").is_err());
            assert!(validate_identifier("new").is_err());
        }

        #[test]
        fn class_names() {
            assert!(validate_class_name("java.util.Map").is_ok());
            assert!(validate_class_name("a.Outer$Inner").is_ok());
            assert!(validate_class_name("Foo").is_ok());
            assert!(validate_class_name("a..Foo").is_err());
            assert!(validate_class_name("a.Foo.").is_err());
            assert!(validate_class_name("a.class.Foo").is_err());
        }
    }

    mod validated {
        use super::*;

        #[test]
        fn failures_accumulate() {
            let v = Validated::identifier("from", "1x")
                .and(Validated::identifier("to", "ok"))
                .and(Validated::required("owner", Some("  ")));
            let properties: Vec<&str> = v.failures().iter().map(|f| f.property.as_str()).collect();
            assert_eq!(properties, ["from", "owner"]);
        }

        #[test]
        fn into_result_is_invalid_arguments() {
            let err = Validated::invalid("to", "is required")
                .into_result("ChangeFieldName")
                .unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert!(err.to_string().contains("ChangeFieldName has invalid options: to: is required"));
        }

        #[test]
        fn valid_is_ok() {
            assert!(Validated::valid().into_result("X").is_ok());
        }
    }
}
