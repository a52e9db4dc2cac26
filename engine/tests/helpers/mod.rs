//! Shared setup for the store integration tests. Mirrors `core-new`'s
//! own `tests/helpers` convention of one small helper module imported
//! by every `tests/*_test.rs` file via `#[path = "helpers/mod.rs"]`.

use sd_vfs_engine::db::Database;
use sd_vfs_engine::{root::RootKind, MetadataStore};
use uuid::Uuid;

/// Connects to the Postgres instance named by `ENGINE_TEST_DATABASE_URL`
/// and runs migrations. Every test using this helper is `#[ignore]`d —
/// run them explicitly with `cargo test -- --ignored` against a
/// disposable database.
pub async fn test_store() -> MetadataStore {
	let url = std::env::var("ENGINE_TEST_DATABASE_URL")
		.expect("ENGINE_TEST_DATABASE_URL must point at a disposable Postgres instance");
	let db = Database::connect(&url, 5).await.expect("failed to connect to test database");
	db.migrate().await.expect("failed to run migrations");
	MetadataStore::new(db.conn().clone())
}

pub fn new_user() -> Uuid {
	Uuid::new_v4()
}

/// Creates a fresh personal root for `user` and returns its node id.
pub async fn personal_root(store: &MetadataStore, user: Uuid) -> i64 {
	store
		.create_root(user, RootKind::Personal, 50 * 1024 * 1024)
		.await
		.expect("create_root should succeed")
		.id
}
