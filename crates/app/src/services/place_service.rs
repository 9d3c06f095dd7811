//! Place service — use-cases for managing places.

use placehub_domain::error::{Field, NotFoundError, PlaceHubError, ValidationError, Violation};
use placehub_domain::id::PlaceId;
use placehub_domain::page::{Page, PageLimits};
use placehub_domain::place::{NewPlace, Place, PlaceChanges};
use placehub_domain::slug::slugify;
use placehub_domain::time;

use crate::ports::PlaceRepository;

/// Application service for place CRUD operations.
///
/// Holds no state besides its repository and paging limits; every call goes
/// to the store.
pub struct PlaceService<R> {
    repo: R,
    limits: PageLimits,
}

impl<R: PlaceRepository> PlaceService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self::with_limits(repo, PageLimits::default())
    }

    /// Create a new service with custom paging limits.
    pub fn with_limits(repo: R, limits: PageLimits) -> Self {
        Self { repo, limits }
    }

    /// List places ordered by name, one page at a time.
    ///
    /// `name_filter` keeps only places whose name contains it, ignoring case;
    /// a blank filter is no filter. `page` and `per_page` are raw caller input
    /// and are resolved against the configured [`PageLimits`].
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn list_places(
        &self,
        name_filter: Option<&str>,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> Result<Page<Place>, PlaceHubError> {
        let filter = name_filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(ToOwned::to_owned);
        let request = self.limits.resolve(page, per_page);
        self.repo.find_page(filter, request).await
    }

    /// Create a new place, deriving its slug from the name when none is given.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceHubError::Validation`] when the name or slug is already
    /// used, or when no slug is given and none can be derived from the name.
    /// Storage errors are propagated from the repository.
    #[tracing::instrument(skip(self, new), fields(place_name = %new.name()))]
    pub async fn create_place(&self, new: NewPlace) -> Result<Place, PlaceHubError> {
        let slug = match new.slug() {
            Some(slug) => slug.to_owned(),
            None => derive_slug(new.name())?,
        };

        let mut violations = Vec::new();
        if self.repo.name_taken(new.name().to_owned(), None).await? {
            violations.push(Violation::Taken(Field::Name));
        }
        if self.repo.slug_taken(slug.clone(), None).await? {
            violations.push(Violation::Taken(Field::Slug));
        }
        if let Some(err) = ValidationError::from_violations(violations) {
            return Err(err.into());
        }

        let place = self.repo.create(new.into_draft(slug, time::now())).await?;
        tracing::info!(place_id = %place.id, slug = %place.slug, "place created");
        Ok(place)
    }

    /// Look up a place by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceHubError::NotFound`] when no place with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_place(&self, id: PlaceId) -> Result<Place, PlaceHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    /// Apply a partial update to an existing place.
    ///
    /// A new name without an explicit slug also replaces the slug with one
    /// derived from that name. Uniqueness is checked against every other
    /// place, so keeping one's own name or slug is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceHubError::NotFound`] when the place does not exist (or
    /// disappears before the write), [`PlaceHubError::Validation`] on a
    /// uniqueness conflict or an underivable slug, or a storage error.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_place(
        &self,
        id: PlaceId,
        changes: PlaceChanges,
    ) -> Result<Place, PlaceHubError> {
        let current = self.get_place(id).await?;
        if changes.is_empty() {
            return Ok(current);
        }

        let derived = match (changes.name(), changes.slug()) {
            (Some(name), None) => Some(derive_slug(name)?),
            _ => None,
        };
        let changes = match derived {
            Some(slug) => changes.with_slug(slug),
            None => changes,
        };

        let mut violations = Vec::new();
        if let Some(name) = changes.name()
            && self.repo.name_taken(name.to_owned(), Some(id)).await?
        {
            violations.push(Violation::Taken(Field::Name));
        }
        if let Some(slug) = changes.slug()
            && self.repo.slug_taken(slug.to_owned(), Some(id)).await?
        {
            violations.push(Violation::Taken(Field::Slug));
        }
        if let Some(err) = ValidationError::from_violations(violations) {
            return Err(err.into());
        }

        let updated = self
            .repo
            .update(id, changes, time::now())
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::debug!(place_id = %updated.id, slug = %updated.slug, "place updated");
        Ok(updated)
    }

    /// Delete a place by id, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_place(&self, id: PlaceId) -> Result<bool, PlaceHubError> {
        let deleted = self.repo.delete(id).await?;
        if deleted {
            tracing::info!(place_id = %id, "place deleted");
        }
        Ok(deleted)
    }
}

fn derive_slug(name: &str) -> Result<String, PlaceHubError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(Violation::Unsluggable.into());
    }
    Ok(slug)
}

fn not_found(id: PlaceId) -> PlaceHubError {
    NotFoundError {
        entity: "Place",
        id: id.to_string(),
    }
    .into()
}
