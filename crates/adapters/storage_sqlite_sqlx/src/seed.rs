//! Demo data for a fresh database.

use sqlx::SqlitePool;

use placehub_domain::slug::slugify;
use placehub_domain::time;

use crate::error::StorageError;
use crate::place_repo::{INSERT, fold};

/// `(name, city, state)` of the landmarks inserted by [`seed_demo_places`].
pub const DEMO_PLACES: [(&str, &str, &str); 8] = [
    ("Central Park", "New York", "New York"),
    ("Golden Gate Bridge", "San Francisco", "California"),
    ("Times Square", "New York", "New York"),
    ("Hollywood Sign", "Los Angeles", "California"),
    ("Miami Beach", "Miami", "Florida"),
    ("Lincoln Memorial", "Washington", "District of Columbia"),
    ("Space Needle", "Seattle", "Washington"),
    ("Navy Pier", "Chicago", "Illinois"),
];

/// Insert [`DEMO_PLACES`] when the `places` table is empty.
///
/// Returns the number of rows inserted, which is zero when the table already
/// held data. All rows are written in one transaction.
///
/// # Errors
///
/// Returns [`StorageError`] if any query fails; nothing is inserted then.
pub async fn seed_demo_places(pool: &SqlitePool) -> Result<usize, StorageError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM places")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        tracing::debug!(existing, "places table not empty, skipping seed");
        return Ok(0);
    }

    let now = time::now().to_rfc3339();
    let mut tx = pool.begin().await?;
    for (name, city, state) in DEMO_PLACES {
        sqlx::query(INSERT)
            .bind(name)
            .bind(fold(name))
            .bind(slugify(name))
            .bind(city)
            .bind(state)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(count = DEMO_PLACES.len(), "seeded demo places");
    Ok(DEMO_PLACES.len())
}
