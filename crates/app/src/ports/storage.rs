//! Storage port — repository trait for place persistence.

use std::future::Future;

use placehub_domain::error::PlaceHubError;
use placehub_domain::id::PlaceId;
use placehub_domain::page::{Page, PageRequest};
use placehub_domain::place::{Place, PlaceChanges, PlaceDraft};
use placehub_domain::time::Timestamp;

/// Repository for persisting and querying [`Place`]s.
///
/// Implementations must enforce uniqueness of `name` and `slug` themselves
/// and report a violation as [`PlaceHubError::Validation`] naming the field,
/// so that two writers racing past the service's own checks are still
/// serialised by the store.
pub trait PlaceRepository {
    /// Insert a new place and return it with its assigned id.
    fn create(
        &self,
        draft: PlaceDraft,
    ) -> impl Future<Output = Result<Place, PlaceHubError>> + Send;

    /// Get a place by its unique identifier.
    fn get_by_id(
        &self,
        id: PlaceId,
    ) -> impl Future<Output = Result<Option<Place>, PlaceHubError>> + Send;

    /// Fetch one page of places ordered by name.
    ///
    /// When `name_filter` is set, only places whose name contains it
    /// (ignoring case) are considered, both for the items and the total.
    fn find_page(
        &self,
        name_filter: Option<String>,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<Place>, PlaceHubError>> + Send;

    /// Whether a place other than `except` already uses `name`.
    fn name_taken(
        &self,
        name: String,
        except: Option<PlaceId>,
    ) -> impl Future<Output = Result<bool, PlaceHubError>> + Send;

    /// Whether a place other than `except` already uses `slug`.
    fn slug_taken(
        &self,
        slug: String,
        except: Option<PlaceId>,
    ) -> impl Future<Output = Result<bool, PlaceHubError>> + Send;

    /// Write the fields present in `changes` and set `updated_at`, leaving
    /// every other column as currently stored, then return the stored row.
    ///
    /// Returns `None` when the row no longer exists.
    fn update(
        &self,
        id: PlaceId,
        changes: PlaceChanges,
        updated_at: Timestamp,
    ) -> impl Future<Output = Result<Option<Place>, PlaceHubError>> + Send;

    /// Delete a place, returning whether a row was removed.
    fn delete(&self, id: PlaceId) -> impl Future<Output = Result<bool, PlaceHubError>> + Send;
}
