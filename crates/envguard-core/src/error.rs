//! # Error Types — Structured Validation Failures
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations, except [`ValidationFailure`], whose message is assembled
//! from its issue list.
//!
//! ## Design
//!
//! - A validation run collects every failing field before it reports;
//!   a failure never carries just the first problem.
//! - Each [`Issue`] names the field path, a machine-readable [`IssueCode`]
//!   and a human-readable message.
//! - Writing a declaration artifact fails with [`EnvGuardError::Io`], which
//!   keeps the target path next to the underlying `std::io::Error`.
//! - Deserializing a validated object into a caller type fails with
//!   [`EnvGuardError::Shape`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for envguard operations.
#[derive(Error, Debug)]
pub enum EnvGuardError {
    /// The environment did not satisfy the schema.
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// The type-declaration artifact could not be written.
    #[error("cannot write type declaration to '{}': {source}", .path.display())]
    Io {
        /// Target path of the artifact.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// The validated object does not deserialize into the requested type.
    #[error("validated environment does not fit the target type: {0}")]
    Shape(#[from] serde_json::Error),
}

impl EnvGuardError {
    /// Returns the validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation(failure) => Some(failure),
            Self::Io { .. } | Self::Shape(_) => None,
        }
    }
}

/// Machine-readable reason a field was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueCode {
    /// A required variable is absent.
    Missing,
    /// The value has the wrong type after coercion.
    InvalidType {
        /// Type name the schema declares.
        expected: String,
        /// Type name actually received.
        received: String,
    },
    /// The value is not one of the enum literals.
    InvalidEnumValue {
        /// Accepted literals, in declaration order.
        options: Vec<String>,
        /// The rejected value.
        received: String,
    },
    /// The string is not a parseable absolute URL.
    InvalidUrl,
    /// The string is shorter than allowed.
    TooShort {
        /// Minimum length in characters.
        minimum: usize,
    },
    /// The string is longer than allowed.
    TooLong {
        /// Maximum length in characters.
        maximum: usize,
    },
    /// The number has a fractional part or is not finite.
    NotInteger,
    /// The number is not finite.
    NotFinite,
    /// The number is below the lower bound.
    TooSmall {
        /// Lower bound.
        minimum: f64,
    },
    /// The number is above the upper bound.
    TooBig {
        /// Upper bound.
        maximum: f64,
    },
    /// A custom transform rejected the value.
    Custom(String),
}

impl IssueCode {
    /// Stable snake_case name, suitable for structured logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::InvalidType { .. } => "invalid_type",
            Self::InvalidEnumValue { .. } => "invalid_enum_value",
            Self::InvalidUrl => "invalid_url",
            Self::TooShort { .. } => "too_short",
            Self::TooLong { .. } => "too_long",
            Self::NotInteger => "not_integer",
            Self::NotFinite => "not_finite",
            Self::TooSmall { .. } => "too_small",
            Self::TooBig { .. } => "too_big",
            Self::Custom(_) => "custom",
        }
    }

    /// Human-readable description of the problem.
    pub fn message(&self) -> String {
        match self {
            Self::Missing => "required variable is not set".to_string(),
            Self::InvalidType { expected, received } => {
                format!("expected {expected}, received {received}")
            }
            Self::InvalidEnumValue { options, received } => {
                let options = options
                    .iter()
                    .map(|o| format!("'{o}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                format!("invalid enum value; expected {options}, received '{received}'")
            }
            Self::InvalidUrl => "invalid url".to_string(),
            Self::TooShort { minimum } => {
                format!("must contain at least {minimum} character(s)")
            }
            Self::TooLong { maximum } => {
                format!("must contain at most {maximum} character(s)")
            }
            Self::NotInteger => "expected integer, received float".to_string(),
            Self::NotFinite => "number must be finite".to_string(),
            Self::TooSmall { minimum } => {
                format!("number must be greater than or equal to {minimum}")
            }
            Self::TooBig { maximum } => {
                format!("number must be less than or equal to {maximum}")
            }
            Self::Custom(message) => message.clone(),
        }
    }
}

/// A single rejected field with structured context.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// Field path from the schema root; nested objects add segments.
    pub path: Vec<String>,
    /// Machine-readable reason.
    pub code: IssueCode,
    /// Human-readable reason.
    pub message: String,
}

impl Issue {
    /// Build an issue whose message is derived from its code.
    pub fn new(path: Vec<String>, code: IssueCode) -> Self {
        let message = code.message();
        Self {
            path,
            code,
            message,
        }
    }

    /// Dot-joined path, e.g. `DB.HOST`.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.path_string(), self.message)
        }
    }
}

/// Every issue found by one validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    issues: Vec<Issue>,
}

impl ValidationFailure {
    /// Wrap a list of issues. The order is kept as given.
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Returns the number of issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns true if there are no issues.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns a slice of all issues.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Issue> {
        self.issues
    }

    /// Distinct failing field paths, in first-seen order.
    pub fn fields(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for issue in &self.issues {
            let path = issue.path_string();
            if !seen.contains(&path) {
                seen.push(path);
            }
        }
        seen
    }

    /// Returns true if any issue targets the given dot-joined path.
    pub fn has_field(&self, path: &str) -> bool {
        self.issues.iter().any(|i| i.path_string() == path)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid environment variables")?;
        for issue in &self.issues {
            write!(f, "\n{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> Vec<String> {
        p.split('.').map(str::to_string).collect()
    }

    #[test]
    fn issue_message_follows_code() {
        let issue = Issue::new(
            path("PORT"),
            IssueCode::InvalidType {
                expected: "number".into(),
                received: "string".into(),
            },
        );
        assert_eq!(issue.message, "expected number, received string");
        assert_eq!(issue.to_string(), "  PORT: expected number, received string");
    }

    #[test]
    fn nested_path_is_dot_joined() {
        let issue = Issue::new(path("DB.HOST"), IssueCode::Missing);
        assert_eq!(issue.path_string(), "DB.HOST");
    }

    #[test]
    fn enum_message_lists_options_in_order() {
        let code = IssueCode::InvalidEnumValue {
            options: vec!["development".into(), "production".into()],
            received: "staging".into(),
        };
        assert_eq!(
            code.message(),
            "invalid enum value; expected 'development' | 'production', received 'staging'"
        );
    }

    #[test]
    fn failure_display_lists_every_issue() {
        let failure = ValidationFailure::new(vec![
            Issue::new(path("NODE_ENV"), IssueCode::Missing),
            Issue::new(path("DATABASE_URL"), IssueCode::InvalidUrl),
        ]);
        let text = failure.to_string();
        assert!(text.starts_with("invalid environment variables"));
        assert!(text.contains("  NODE_ENV: required variable is not set"));
        assert!(text.contains("  DATABASE_URL: invalid url"));
        assert_eq!(failure.len(), 2);
    }

    #[test]
    fn fields_are_deduplicated_in_order() {
        let failure = ValidationFailure::new(vec![
            Issue::new(path("NAME"), IssueCode::TooShort { minimum: 3 }),
            Issue::new(path("PORT"), IssueCode::NotInteger),
            Issue::new(path("NAME"), IssueCode::InvalidUrl),
        ]);
        assert_eq!(failure.fields(), vec!["NAME".to_string(), "PORT".to_string()]);
        assert!(failure.has_field("PORT"));
        assert!(!failure.has_field("HOST"));
    }

    #[test]
    fn io_error_names_the_path() {
        let err = EnvGuardError::Io {
            path: PathBuf::from("/nope/env.d.ts"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing directory"),
        };
        assert_eq!(
            err.to_string(),
            "cannot write type declaration to '/nope/env.d.ts': missing directory"
        );
        assert!(err.as_validation().is_none());
    }
}
