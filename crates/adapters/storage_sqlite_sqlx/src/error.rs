//! Storage-specific error type wrapping sqlx errors.

use placehub_domain::error::{Field, PlaceHubError, Violation};

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The database could not be opened.
    #[error("failed to open places database")]
    Connect(#[source] sqlx::Error),

    /// A query against the `places` table failed.
    #[error("places query failed")]
    Database(#[from] sqlx::Error),

    /// The schema migrations could not be applied.
    #[error("failed to apply places schema migrations")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for PlaceHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Map a failed write, turning unique-index violations on `places` into a
/// validation error on the offending field.
pub(crate) fn map_write_error(err: sqlx::Error) -> PlaceHubError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
    {
        // SQLite reports "UNIQUE constraint failed: places.<column>"
        let field = if db.message().contains("places.slug") {
            Field::Slug
        } else {
            Field::Name
        };
        tracing::debug!(%field, "unique constraint rejected write");
        return Violation::Taken(field).into();
    }
    StorageError::from(err).into()
}
