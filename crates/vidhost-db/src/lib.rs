//! Vidhost Database Library
//!
//! Asset record store: the `VideoRecords` trait consumed by the upload
//! pipeline, plus its Postgres implementation. The trait seam exists so the
//! orchestration logic can be exercised with an in-memory fake.

mod records;

pub use records::{PgVideoRecords, VideoRecords};

use sqlx::PgPool;

/// Run embedded migrations against the given pool.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
