//! `SQLite` implementation of [`PlaceRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use placehub_app::ports::PlaceRepository;
use placehub_domain::error::PlaceHubError;
use placehub_domain::id::PlaceId;
use placehub_domain::page::{Page, PageRequest};
use placehub_domain::place::{Place, PlaceChanges, PlaceDraft};
use placehub_domain::time::Timestamp;

use crate::error::{StorageError, map_write_error};

/// Wrapper for converting database rows into domain [`Place`].
struct Wrapper(Place);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Place> {
        value.map(|w| w.0)
    }
}

/// Case-folded form of a name, stored in `name_folded` and matched against a
/// filter folded the same way.
pub(crate) fn fold(name: &str) -> String {
    name.to_lowercase()
}

fn parse_timestamp(value: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let slug: String = row.try_get("slug")?;
        let city: String = row.try_get("city")?;
        let state: String = row.try_get("state")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(Place {
            id: PlaceId::new(id),
            name,
            slug,
            city,
            state,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        }))
    }
}

pub(crate) const INSERT: &str = r"
    INSERT INTO places (name, name_folded, slug, city, state, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM places WHERE id = ?";
// the folded filter is bound twice: once for the NULL test, once for the match
const COUNT_MATCHING: &str = r"
    SELECT COUNT(*) FROM places
    WHERE (? IS NULL OR instr(name_folded, ?) > 0)
";
const SELECT_PAGE: &str = r"
    SELECT * FROM places
    WHERE (? IS NULL OR instr(name_folded, ?) > 0)
    ORDER BY name, id
    LIMIT ? OFFSET ?
";
const NAME_TAKEN: &str = r"
    SELECT EXISTS (SELECT 1 FROM places WHERE name = ? AND (? IS NULL OR id <> ?))
";
const SLUG_TAKEN: &str = r"
    SELECT EXISTS (SELECT 1 FROM places WHERE slug = ? AND (? IS NULL OR id <> ?))
";
// a NULL parameter keeps the stored column
const UPDATE: &str = r"
    UPDATE places
    SET name = coalesce(?, name),
        name_folded = coalesce(?, name_folded),
        slug = coalesce(?, slug),
        city = coalesce(?, city),
        state = coalesce(?, state),
        updated_at = ?
    WHERE id = ?
    RETURNING *
";
const DELETE_BY_ID: &str = "DELETE FROM places WHERE id = ?";

/// `SQLite`-backed place repository.
pub struct SqlitePlaceRepository {
    pool: SqlitePool,
}

impl SqlitePlaceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn exists(
        &self,
        query: &'static str,
        value: String,
        except: Option<PlaceId>,
    ) -> impl Future<Output = Result<bool, PlaceHubError>> + Send {
        let pool = self.pool.clone();
        let except = except.map(PlaceId::get);
        async move {
            let found: i64 = sqlx::query_scalar(query)
                .bind(value)
                .bind(except)
                .bind(except)
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(found != 0)
        }
    }
}

impl PlaceRepository for SqlitePlaceRepository {
    fn create(
        &self,
        draft: PlaceDraft,
    ) -> impl Future<Output = Result<Place, PlaceHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let timestamp = draft.created_at.to_rfc3339();
            let result = sqlx::query(INSERT)
                .bind(&draft.name)
                .bind(fold(&draft.name))
                .bind(&draft.slug)
                .bind(&draft.city)
                .bind(&draft.state)
                .bind(&timestamp)
                .bind(&timestamp)
                .execute(&pool)
                .await
                .map_err(map_write_error)?;

            Ok(Place {
                id: PlaceId::new(result.last_insert_rowid()),
                name: draft.name,
                slug: draft.slug,
                city: draft.city,
                state: draft.state,
                created_at: draft.created_at,
                updated_at: draft.created_at,
            })
        }
    }

    fn get_by_id(
        &self,
        id: PlaceId,
    ) -> impl Future<Output = Result<Option<Place>, PlaceHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.get())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn find_page(
        &self,
        name_filter: Option<String>,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<Place>, PlaceHubError>> + Send {
        let pool = self.pool.clone();
        let name_filter = name_filter.as_deref().map(fold);
        async move {
            let total: i64 = sqlx::query_scalar(COUNT_MATCHING)
                .bind(name_filter.as_deref())
                .bind(name_filter.as_deref())
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_PAGE)
                .bind(name_filter.as_deref())
                .bind(name_filter.as_deref())
                .bind(i64::from(request.per_page()))
                .bind(offset)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            let items = rows.into_iter().map(|w| w.0).collect();
            Ok(Page::new(items, request, total.unsigned_abs()))
        }
    }

    fn name_taken(
        &self,
        name: String,
        except: Option<PlaceId>,
    ) -> impl Future<Output = Result<bool, PlaceHubError>> + Send {
        self.exists(NAME_TAKEN, name, except)
    }

    fn slug_taken(
        &self,
        slug: String,
        except: Option<PlaceId>,
    ) -> impl Future<Output = Result<bool, PlaceHubError>> + Send {
        self.exists(SLUG_TAKEN, slug, except)
    }

    fn update(
        &self,
        id: PlaceId,
        changes: PlaceChanges,
        updated_at: Timestamp,
    ) -> impl Future<Output = Result<Option<Place>, PlaceHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(UPDATE)
                .bind(changes.name())
                .bind(changes.name().map(fold))
                .bind(changes.slug())
                .bind(changes.city())
                .bind(changes.state())
                .bind(updated_at.to_rfc3339())
                .bind(id.get())
                .fetch_optional(&pool)
                .await
                .map_err(map_write_error)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn delete(&self, id: PlaceId) -> impl Future<Output = Result<bool, PlaceHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.get())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use placehub_app::services::place_service::PlaceService;
    use placehub_domain::error::{Field, Violation};
    use placehub_domain::place::NewPlace;
    use placehub_domain::time;

    async fn pool() -> SqlitePool {
        Config::in_memory().build().await.unwrap().pool().clone()
    }

    async fn setup() -> SqlitePlaceRepository {
        SqlitePlaceRepository::new(pool().await)
    }

    fn draft(name: &str, slug: &str) -> PlaceDraft {
        PlaceDraft {
            name: name.to_string(),
            slug: slug.to_string(),
            city: "New York".to_string(),
            state: "NY".to_string(),
            created_at: time::now(),
        }
    }

    fn names(page: &Page<Place>) -> Vec<&str> {
        page.items.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_place_when_valid() {
        let repo = setup().await;
        let created = repo.create(draft("Central Park", "central-park")).await.unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.slug, "central-park");
    }

    #[tokio::test]
    async fn should_assign_increasing_ids() {
        let repo = setup().await;
        let first = repo.create(draft("A", "a")).await.unwrap();
        let second = repo.create(draft("B", "b")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn should_return_none_when_place_not_found() {
        let repo = setup().await;
        let result = repo.get_by_id(PlaceId::new(404)).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_reject_duplicate_name_at_store_level() {
        let repo = setup().await;
        repo.create(draft("Central Park", "central-park")).await.unwrap();

        let result = repo.create(draft("Central Park", "other-slug")).await;
        match result {
            Err(PlaceHubError::Validation(err)) => {
                assert_eq!(err.violations(), &[Violation::Taken(Field::Name)]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_reject_duplicate_slug_at_store_level() {
        let repo = setup().await;
        repo.create(draft("Central Park", "central-park")).await.unwrap();

        let result = repo.create(draft("Other Park", "central-park")).await;
        match result {
            Err(PlaceHubError::Validation(err)) => {
                assert_eq!(err.violations(), &[Violation::Taken(Field::Slug)]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_order_page_by_name() {
        let repo = setup().await;
        repo.create(draft("Zebra Park", "zebra-park")).await.unwrap();
        repo.create(draft("Alpha Beach", "alpha-beach")).await.unwrap();
        repo.create(draft("Beta Museum", "beta-museum")).await.unwrap();

        let page = repo.find_page(None, PageRequest::default()).await.unwrap();
        assert_eq!(names(&page), ["Alpha Beach", "Beta Museum", "Zebra Park"]);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn should_filter_by_case_insensitive_substring() {
        let repo = setup().await;
        repo.create(draft("Beautiful Park", "beautiful-park")).await.unwrap();
        repo.create(draft("Amazing Beach", "amazing-beach")).await.unwrap();
        repo.create(draft("Historic Museum", "historic-museum")).await.unwrap();

        let page = repo
            .find_page(Some("PARK".to_string()), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(names(&page), ["Beautiful Park"]);
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn should_treat_like_wildcards_literally() {
        let repo = setup().await;
        repo.create(draft("100% Park", "100-park")).await.unwrap();
        repo.create(draft("Plain Park", "plain-park")).await.unwrap();

        let page = repo
            .find_page(Some("%".to_string()), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(names(&page), ["100% Park"]);

        let page = repo
            .find_page(Some("_".to_string()), PageRequest::default())
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn should_slice_pages_and_count_all_matches() {
        let repo = setup().await;
        for i in 0..20 {
            let name = format!("Place {i:02}");
            repo.create(draft(&name, &format!("place-{i:02}"))).await.unwrap();
        }

        let first = repo.find_page(None, PageRequest::new(1, 5)).await.unwrap();
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.total, 20);
        assert_eq!(first.items[0].name, "Place 00");

        let third = repo.find_page(None, PageRequest::new(3, 5)).await.unwrap();
        assert_eq!(third.items[0].name, "Place 10");

        let beyond = repo.find_page(None, PageRequest::new(5, 5)).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 20);
    }

    #[tokio::test]
    async fn should_exclude_given_place_from_taken_checks() {
        let repo = setup().await;
        let place = repo.create(draft("Central Park", "central-park")).await.unwrap();

        assert!(repo.name_taken("Central Park".to_string(), None).await.unwrap());
        assert!(
            !repo
                .name_taken("Central Park".to_string(), Some(place.id))
                .await
                .unwrap()
        );
        assert!(repo.slug_taken("central-park".to_string(), None).await.unwrap());
        assert!(
            !repo
                .slug_taken("central-park".to_string(), Some(place.id))
                .await
                .unwrap()
        );
        assert!(!repo.name_taken("Other".to_string(), None).await.unwrap());
    }

    #[tokio::test]
    async fn should_filter_non_ascii_names_ignoring_case() {
        let repo = setup().await;
        repo.create(draft("Église Saint-Pierre", "eglise-saint-pierre"))
            .await
            .unwrap();
        repo.create(draft("Englischer Garten", "englischer-garten"))
            .await
            .unwrap();

        for filter in ["église", "ÉGLISE", "SAINT-PIERRE"] {
            let page = repo
                .find_page(Some(filter.to_string()), PageRequest::default())
                .await
                .unwrap();
            assert_eq!(names(&page), ["Église Saint-Pierre"], "filter {filter:?}");
            assert_eq!(page.total, 1);
        }
    }

    #[tokio::test]
    async fn should_write_only_supplied_columns_when_updating() {
        let repo = setup().await;
        let place = repo.create(draft("Old Name", "old-name")).await.unwrap();
        let now = time::now();

        let changes = PlaceChanges::builder()
            .name("Ñandú Plaza")
            .slug("nandu-plaza")
            .build()
            .unwrap();
        let updated = repo.update(place.id, changes, now).await.unwrap().unwrap();

        assert_eq!(updated.name, "Ñandú Plaza");
        assert_eq!(updated.slug, "nandu-plaza");
        assert_eq!(updated.city, "New York");
        assert_eq!(updated.state, "NY");
        assert_eq!(updated.created_at, place.created_at);
        assert_eq!(updated.updated_at, now);
        assert_eq!(repo.get_by_id(place.id).await.unwrap().unwrap(), updated);

        let page = repo
            .find_page(Some("ñandú".to_string()), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn should_reject_rename_to_taken_name_at_store_level() {
        let repo = setup().await;
        repo.create(draft("Central Park", "central-park")).await.unwrap();
        let other = repo.create(draft("Other Park", "other-park")).await.unwrap();

        let changes = PlaceChanges::builder().name("Central Park").build().unwrap();
        let result = repo.update(other.id, changes, time::now()).await;

        match result {
            Err(PlaceHubError::Validation(err)) => {
                assert_eq!(err.violations(), &[Violation::Taken(Field::Name)]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_return_none_when_updating_deleted_place() {
        let repo = setup().await;
        let place = repo.create(draft("Gone", "gone")).await.unwrap();
        repo.delete(place.id).await.unwrap();

        let changes = PlaceChanges::builder().city("Boston").build().unwrap();
        let result = repo.update(place.id, changes, time::now()).await.unwrap();
        assert!(result.is_none());
    }

    /// Commits a change to `state` right after every read, standing in for
    /// another client updating the same place mid-request.
    struct StateChangedAfterRead {
        inner: SqlitePlaceRepository,
        pool: SqlitePool,
    }

    impl PlaceRepository for StateChangedAfterRead {
        fn create(
            &self,
            draft: PlaceDraft,
        ) -> impl Future<Output = Result<Place, PlaceHubError>> + Send {
            self.inner.create(draft)
        }

        fn get_by_id(
            &self,
            id: PlaceId,
        ) -> impl Future<Output = Result<Option<Place>, PlaceHubError>> + Send {
            let read = self.inner.get_by_id(id);
            let pool = self.pool.clone();
            async move {
                let found = read.await?;
                sqlx::query("UPDATE places SET state = 'CA' WHERE id = ?")
                    .bind(id.get())
                    .execute(&pool)
                    .await
                    .unwrap();
                Ok(found)
            }
        }

        fn find_page(
            &self,
            name_filter: Option<String>,
            request: PageRequest,
        ) -> impl Future<Output = Result<Page<Place>, PlaceHubError>> + Send {
            self.inner.find_page(name_filter, request)
        }

        fn name_taken(
            &self,
            name: String,
            except: Option<PlaceId>,
        ) -> impl Future<Output = Result<bool, PlaceHubError>> + Send {
            self.inner.name_taken(name, except)
        }

        fn slug_taken(
            &self,
            slug: String,
            except: Option<PlaceId>,
        ) -> impl Future<Output = Result<bool, PlaceHubError>> + Send {
            self.inner.slug_taken(slug, except)
        }

        fn update(
            &self,
            id: PlaceId,
            changes: PlaceChanges,
            updated_at: Timestamp,
        ) -> impl Future<Output = Result<Option<Place>, PlaceHubError>> + Send {
            self.inner.update(id, changes, updated_at)
        }

        fn delete(&self, id: PlaceId) -> impl Future<Output = Result<bool, PlaceHubError>> + Send {
            self.inner.delete(id)
        }
    }

    #[tokio::test]
    async fn should_keep_concurrent_change_to_untouched_column() {
        let pool = pool().await;
        let svc = PlaceService::new(StateChangedAfterRead {
            inner: SqlitePlaceRepository::new(pool.clone()),
            pool,
        });
        let new = NewPlace::builder()
            .name("Prospect Park")
            .city("New York")
            .state("NY")
            .build()
            .unwrap();
        let created = svc.create_place(new).await.unwrap();

        let changes = PlaceChanges::builder().city("Brooklyn").build().unwrap();
        let updated = svc.update_place(created.id, changes).await.unwrap();

        assert_eq!(updated.city, "Brooklyn");
        assert_eq!(updated.state, "CA");
    }

    #[tokio::test]
    async fn should_delete_place_when_exists() {
        let repo = setup().await;
        let place = repo.create(draft("Central Park", "central-park")).await.unwrap();

        assert!(repo.delete(place.id).await.unwrap());
        assert!(repo.get_by_id(place.id).await.unwrap().is_none());
        assert!(!repo.delete(place.id).await.unwrap());
    }
}
