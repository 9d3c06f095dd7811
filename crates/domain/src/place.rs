//! Place — a named location with city and state metadata.
//!
//! Incoming data never reaches the store as loose strings: it is first turned
//! into a [`NewPlace`] or [`PlaceChanges`] by their builders, which normalise
//! the input and report every format problem at once. Uniqueness is not a
//! format rule and is checked later, against the store.

use serde::{Deserialize, Serialize};

use crate::error::{Field, ValidationError, Violation};
use crate::id::PlaceId;
use crate::time::Timestamp;

/// Longest accepted value, in characters, for every text field.
pub const MAX_FIELD_LENGTH: usize = 255;

/// A stored place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub slug: String,
    pub city: String,
    pub state: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Place {
    /// Overwrite every field present in `changes` and bump `updated_at`.
    ///
    /// The slug is taken verbatim from `changes`; deriving it from a new name
    /// is the caller's decision.
    pub fn apply(&mut self, changes: PlaceChanges, now: Timestamp) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(slug) = changes.slug {
            self.slug = slug;
        }
        if let Some(city) = changes.city {
            self.city = city;
        }
        if let Some(state) = changes.state {
            self.state = state;
        }
        self.updated_at = now;
    }
}

/// A place ready to be inserted; the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceDraft {
    pub name: String,
    pub slug: String,
    pub city: String,
    pub state: String,
    pub created_at: Timestamp,
}

/// Checked input for creating a place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlace {
    name: String,
    slug: Option<String>,
    city: String,
    state: String,
}

impl NewPlace {
    /// Create a builder for constructing a [`NewPlace`].
    #[must_use]
    pub fn builder() -> NewPlaceBuilder {
        NewPlaceBuilder::default()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The explicitly requested slug, if any.
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Turn into an insertable draft using the given slug.
    #[must_use]
    pub fn into_draft(self, slug: String, created_at: Timestamp) -> PlaceDraft {
        PlaceDraft {
            name: self.name,
            slug,
            city: self.city,
            state: self.state,
            created_at,
        }
    }
}

/// Step-by-step builder for [`NewPlace`].
#[derive(Debug, Default)]
pub struct NewPlaceBuilder {
    name: Option<String>,
    slug: Option<String>,
    city: Option<String>,
    state: Option<String>,
}

impl NewPlaceBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    #[must_use]
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Consume the builder, normalise and validate, and return a [`NewPlace`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every required field that is
    /// missing or blank and every field longer than [`MAX_FIELD_LENGTH`].
    pub fn build(self) -> Result<NewPlace, ValidationError> {
        let mut violations = Vec::new();
        let name = required(Field::Name, self.name, &mut violations);
        let slug = optional(Field::Slug, self.slug, &mut violations);
        let city = required(Field::City, self.city, &mut violations);
        let state = required(Field::State, self.state, &mut violations);

        if let Some(err) = ValidationError::from_violations(violations) {
            return Err(err);
        }
        Ok(NewPlace {
            name: name.unwrap_or_default(),
            slug,
            city: city.unwrap_or_default(),
            state: state.unwrap_or_default(),
        })
    }
}

/// Checked input for a partial update: only present fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceChanges {
    name: Option<String>,
    slug: Option<String>,
    city: Option<String>,
    state: Option<String>,
}

impl PlaceChanges {
    /// Create a builder for constructing [`PlaceChanges`].
    #[must_use]
    pub fn builder() -> PlaceChangesBuilder {
        PlaceChangesBuilder::default()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Whether no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.slug.is_none() && self.city.is_none() && self.state.is_none()
    }

    /// Replace the requested slug.
    #[must_use]
    pub fn with_slug(mut self, slug: String) -> Self {
        self.slug = Some(slug);
        self
    }
}

/// Step-by-step builder for [`PlaceChanges`].
///
/// A `name`, `city` or `state` that is set but blank is an error: those
/// fields may be left out of an update, not cleared. A blank `slug` counts
/// as not supplied.
#[derive(Debug, Default)]
pub struct PlaceChangesBuilder {
    name: Option<String>,
    slug: Option<String>,
    city: Option<String>,
    state: Option<String>,
}

impl PlaceChangesBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    #[must_use]
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Consume the builder, normalise and validate the present fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every present required field
    /// that is blank and every field longer than [`MAX_FIELD_LENGTH`].
    pub fn build(self) -> Result<PlaceChanges, ValidationError> {
        let mut violations = Vec::new();
        let name = self
            .name
            .and_then(|value| required(Field::Name, Some(value), &mut violations));
        let slug = optional(Field::Slug, self.slug, &mut violations);
        let city = self
            .city
            .and_then(|value| required(Field::City, Some(value), &mut violations));
        let state = self
            .state
            .and_then(|value| required(Field::State, Some(value), &mut violations));

        if let Some(err) = ValidationError::from_violations(violations) {
            return Err(err);
        }
        Ok(PlaceChanges {
            name,
            slug,
            city,
            state,
        })
    }
}

/// Trim `value`; `None` when it is absent or blank.
fn normalize(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

fn check_length(field: Field, value: &str, violations: &mut Vec<Violation>) -> bool {
    if value.chars().count() > MAX_FIELD_LENGTH {
        violations.push(Violation::TooLong {
            field,
            max: MAX_FIELD_LENGTH,
        });
        return false;
    }
    true
}

fn required(
    field: Field,
    value: Option<String>,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match normalize(value) {
        Some(value) => check_length(field, &value, violations).then_some(value),
        None => {
            violations.push(Violation::Required(field));
            None
        }
    }
}

fn optional(
    field: Field,
    value: Option<String>,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    normalize(value).filter(|value| check_length(field, value, violations))
}
