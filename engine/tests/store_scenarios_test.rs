//! End-to-end seed scenarios from spec.md §8, exercised against a real
//! Postgres instance. Every test here requires `ENGINE_TEST_DATABASE_URL`
//! and is `#[ignore]`d by default, the same convention `core-new`'s own
//! database-backed tests use when no disposable instance is wired into
//! CI (see `core-new/src/operations/indexing/tests/closure_table_tests.rs`).

#[path = "helpers/mod.rs"]
mod helpers;

use sd_vfs_engine::grant::GrantableLevel;
use sd_vfs_engine::{EngineError, FileMeta, Permission};

/// *A.* U creates a personal root, folder `A` inside it, uploads a file
/// into `A`. Listing root returns `[A]`; listing `A` returns the file;
/// `effective(U, A)` is at least `admin` (owner collapses to admin).
#[tokio::test]
#[ignore = "requires ENGINE_TEST_DATABASE_URL"]
async fn scenario_a_create_and_list() {
	let store = helpers::test_store().await;
	let user = helpers::new_user();
	let root_id = helpers::personal_root(&store, user).await;

	let folder_a = store.create_folder(root_id, "A", user).await.unwrap();
	let file = store
		.upload_file(
			store.db(),
			folder_a.id,
			"doc.pdf",
			user,
			FileMeta {
				size_bytes: 4,
				mime_type: Some("application/pdf".to_string()),
				expires_at: None,
				metadata: None,
			},
		)
		.await
		.unwrap();

	let root_children = store.list_children(root_id, user).await.unwrap();
	assert_eq!(root_children.len(), 1);
	assert_eq!(root_children[0].0.name, "A");

	let a_children = store.list_children(folder_a.id, user).await.unwrap();
	assert_eq!(a_children.len(), 1);
	assert_eq!(a_children[0].0.name, "doc.pdf");
	assert_eq!(a_children[0].0.id, file.id);

	let (_, effective) = root_children[0].clone();
	assert!(effective.at_least(Permission::Admin));
}

/// *B.* U grants `write` on `A` to V. V creates `B` inside `A`. U
/// deletes `A`. Both `A` and `B` are gone; V's grant on `A` is gone too
/// (cascaded by the foreign key on `grants.node_id`).
#[tokio::test]
#[ignore = "requires ENGINE_TEST_DATABASE_URL"]
async fn scenario_b_delete_cascades_grants_and_descendants() {
	let store = helpers::test_store().await;
	let u = helpers::new_user();
	let v = helpers::new_user();
	let root_id = helpers::personal_root(&store, u).await;

	let folder_a = store.create_folder(root_id, "A", u).await.unwrap();
	store
		.grant(v, folder_a.id, GrantableLevel::Write, u)
		.await
		.unwrap();

	let folder_b = store.create_folder(folder_a.id, "B", v).await.unwrap();

	store.delete(folder_a.id, u).await.unwrap();

	assert!(matches!(
		store.get_file(folder_a.id, u).await.unwrap_err(),
		EngineError::NoPermission { .. } | EngineError::ObjectNotFound(_)
	));
	assert!(matches!(
		store.get_file(folder_b.id, u).await.unwrap_err(),
		EngineError::NoPermission { .. } | EngineError::ObjectNotFound(_)
	));
}

/// *C.* Moving `A` from U's personal root into an organisational root
/// raises `cross-root` and mutates neither store.
#[tokio::test]
#[ignore = "requires ENGINE_TEST_DATABASE_URL"]
async fn scenario_c_cross_root_move_is_rejected() {
	let store = helpers::test_store().await;
	let u = helpers::new_user();
	let personal_root_id = helpers::personal_root(&store, u).await;
	let org_root = store
		.create_root(u, sd_vfs_engine::root::RootKind::Organisational, 50 * 1024 * 1024)
		.await
		.unwrap();

	let folder_a = store.create_folder(personal_root_id, "A", u).await.unwrap();

	let err = store.move_node(folder_a.id, org_root.id, u).await.unwrap_err();
	assert!(matches!(err, EngineError::CrossRoot { .. }));

	let unchanged = store.get_file(folder_a.id, u).await.unwrap();
	assert_eq!(unchanged.parent_id, Some(personal_root_id));
}

/// *D.* U copies `{A, B}` into `T`, which already contains a folder
/// named `A`. `override=false` raises `name-already-exists`;
/// `override=true` deletes prior `T/A` and creates fresh copies.
#[tokio::test]
#[ignore = "requires ENGINE_TEST_DATABASE_URL"]
async fn scenario_d_copy_with_name_conflict() {
	let store = helpers::test_store().await;
	let u = helpers::new_user();
	let root_id = helpers::personal_root(&store, u).await;

	let folder_a = store.create_folder(root_id, "A", u).await.unwrap();
	let folder_b = store.create_folder(root_id, "B", u).await.unwrap();
	let target = store.create_folder(root_id, "T", u).await.unwrap();
	let stale_a = store.create_folder(target.id, "A", u).await.unwrap();

	let err = store
		.copy(&[folder_a.id, folder_b.id], target.id, u, false)
		.await
		.unwrap_err();
	assert!(matches!(err, EngineError::NameAlreadyExists { .. }));

	let (created, mapping) = store
		.copy(&[folder_a.id, folder_b.id], target.id, u, true)
		.await
		.unwrap();
	assert_eq!(created.len(), 2);
	assert!(
		mapping.iter().all(|m| !matches!(m.kind, sd_vfs_engine::NodeKind::File)),
		"copying two empty folders replicates no file blobs"
	);

	assert!(store.get_file(stale_a.id, u).await.is_err());

	let target_children = store.list_children(target.id, u).await.unwrap();
	let names: Vec<&str> = target_children.iter().map(|(n, _)| n.name.as_str()).collect();
	assert!(names.contains(&"A"));
	assert!(names.contains(&"B"));
	assert_eq!(target_children.len(), 2);
}

/// *E.* U grants `read` on a deep node `A/B/C` to V. Visibility derived
/// from the descendant grant reaches every ancestor, but not unrelated
/// siblings.
#[tokio::test]
#[ignore = "requires ENGINE_TEST_DATABASE_URL"]
async fn scenario_e_descendant_grant_gives_ancestor_visibility() {
	let store = helpers::test_store().await;
	let u = helpers::new_user();
	let v = helpers::new_user();
	let root_id = helpers::personal_root(&store, u).await;

	let a = store.create_folder(root_id, "A", u).await.unwrap();
	let b = store.create_folder(a.id, "B", u).await.unwrap();
	let c = store.create_folder(b.id, "C", u).await.unwrap();
	let d = store.create_folder(b.id, "D", u).await.unwrap();

	store.grant(v, c.id, GrantableLevel::Read, u).await.unwrap();

	let resolver = sd_vfs_engine::PermissionResolver::new(store.db());
	assert_eq!(resolver.effective(v, a.id).await.unwrap(), Some(Permission::Read));
	assert_eq!(resolver.effective(v, b.id).await.unwrap(), Some(Permission::Read));
	assert_eq!(resolver.effective(v, c.id).await.unwrap(), Some(Permission::Read));
	assert_eq!(resolver.effective(v, d.id).await.unwrap(), None);
}
