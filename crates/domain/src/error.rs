//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`PlaceHubError`] via `From`.

use std::fmt;

use serde::Serialize;

/// Top-level error returned by services and ports.
#[derive(Debug, thiserror::Error)]
pub enum PlaceHubError {
    /// One or more input fields are invalid.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The referenced record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The storage backend failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Input fields of a place that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Slug,
    City,
    State,
}

impl Field {
    /// The field name as it appears in request and response bodies.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Slug => "slug",
            Self::City => "city",
            Self::State => "state",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single broken rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("The {0} field is required.")]
    Required(Field),

    #[error("The {field} field must not be greater than {max} characters.")]
    TooLong { field: Field, max: usize },

    #[error("A place with this {0} already exists.")]
    Taken(Field),

    /// The name yields an empty slug and no slug was supplied.
    #[error("The slug could not be derived from the name; please supply one.")]
    Unsluggable,
}

impl Violation {
    /// The field this violation is reported against.
    #[must_use]
    pub fn field(&self) -> Field {
        match self {
            Self::Required(field) | Self::TooLong { field, .. } | Self::Taken(field) => *field,
            Self::Unsluggable => Field::Slug,
        }
    }
}

/// A non-empty set of [`Violation`]s found while checking an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    /// Build an error from collected violations, or `None` when there are none.
    #[must_use]
    pub fn from_violations(violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    /// All violations, in the order they were found.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether any violation is reported against `field`.
    #[must_use]
    pub fn has_field(&self, field: Field) -> bool {
        self.violations.iter().any(|v| v.field() == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.first() {
            Some(first) => fmt::Display::fmt(first, f),
            None => f.write_str("invalid input"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<Violation> for ValidationError {
    fn from(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }
}

impl From<Violation> for PlaceHubError {
    fn from(violation: Violation) -> Self {
        Self::Validation(violation.into())
    }
}

/// The record identified by `id` does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
