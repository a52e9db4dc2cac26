//! The `Engine` facade: combines the metadata store, the object-store
//! coordinator and the tree materialiser into the four operations
//! spec.md §4.4 calls out as spanning both subsystems.

use aws_sdk_s3::primitives::ByteStream;
use sea_orm::TransactionTrait;
use tracing::{info, warn};

use crate::blob::ObjectStoreCoordinator;
use crate::config::Config;
use crate::db::entities::node;
use crate::db::entities::root::RootKind;
use crate::db::Database;
use crate::error::{EngineError, NodeId, UserId};
use crate::store::{FileMeta, MetadataStore};
use crate::tree::{RootsView, Tree, TreeMaterialiser};
use crate::{CopyResult, DeleteResult, MoveResult};

pub struct Engine {
	db: Database,
	store: MetadataStore,
	blobs: ObjectStoreCoordinator,
}

impl Engine {
	pub fn new(db: Database, blobs: ObjectStoreCoordinator) -> Self {
		let store = MetadataStore::new(db.conn().clone());
		Self { db, store, blobs }
	}

	/// Connects to Postgres, runs migrations, and builds an S3 client
	/// from `config` (spec.md §6 "Configuration"), following the same
	/// connect-then-migrate-then-serve ordering `core-new`'s
	/// `infrastructure/database/mod.rs` callers use at startup.
	pub async fn bootstrap(config: &Config) -> crate::Result<Self> {
		let db = Database::connect(&config.db_url, config.db_pool_max)
			.await
			.map_err(EngineError::from)?;
		db.migrate().await.map_err(EngineError::from)?;

		let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
			.region(aws_config::Region::new(config.blob_region.clone()))
			.endpoint_url(&config.blob_endpoint)
			.credentials_provider(aws_sdk_s3::config::Credentials::new(
				&config.blob_access_key,
				&config.blob_secret_key,
				None,
				None,
				"engine-config",
			))
			.load()
			.await;
		let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
			.force_path_style(true)
			.build();
		let client = aws_sdk_s3::Client::from_conf(s3_config);
		let blobs = ObjectStoreCoordinator::new(client, config.blob_bucket.clone(), config.blob_concurrency);

		info!("engine bootstrapped");
		Ok(Self::new(db, blobs))
	}

	pub fn store(&self) -> &MetadataStore {
		&self.store
	}

	pub fn blobs(&self) -> &ObjectStoreCoordinator {
		&self.blobs
	}

	/// `upload-with-body(parent, name, body, mime, user)` (spec.md §4.4).
	/// The only combined operation where a blob failure is fatal: the
	/// metadata transaction is rolled back if the upload fails.
	pub async fn upload_with_body(
		&self,
		parent: NodeId,
		name: &str,
		body: ByteStream,
		mime: Option<String>,
		size_bytes: i64,
		user: UserId,
	) -> crate::Result<node::Model> {
		let txn = self.db.conn().begin().await.map_err(EngineError::from)?;

		let meta = FileMeta {
			size_bytes,
			mime_type: mime,
			expires_at: None,
			metadata: None,
		};
		let node_row = self.store.upload_file(&txn, parent, name, user, meta).await?;
		let key = ObjectStoreCoordinator::key_for(&node_row.node_path(), false);

		if let Err(err) = self.blobs.upload(&key, body).await {
			// Metadata never committed, so dropping `txn` rolls it back.
			return Err(err);
		}

		txn.commit().await.map_err(EngineError::from)?;
		Ok(node_row)
	}

	/// `delete-with-blobs(id, user)` (spec.md §4.4). Metadata is deleted
	/// first and is the source of truth; blob deletion is best-effort
	/// and never rolls the metadata delete back.
	pub async fn delete_with_blobs(&self, id: NodeId, user: UserId) -> crate::Result<DeleteResult> {
		let node_row = self.store.get_file(id, user).await.ok();
		let key_prefix = node_row
			.as_ref()
			.map(|n| ObjectStoreCoordinator::key_for(&n.node_path(), n.is_folder()));

		let meta_result = self.store.delete(id, user).await?;

		let Some(prefix) = key_prefix else {
			return Ok(meta_result);
		};

		let outcomes = self.blobs.delete_prefix(&prefix).await;
		let blob_removed = outcomes.iter().filter(|o| o.is_ok()).count() as u64;
		let blob_failed = outcomes.len() as u64 - blob_removed;
		if blob_failed > 0 {
			warn!(blob_failed, node = id, "some blobs failed to delete after metadata removal");
		}

		Ok(DeleteResult {
			meta_removed: meta_result.meta_removed,
			blob_removed,
			blob_failed,
		})
	}

	/// `copy-with-blobs(srcs[], target_folder, user, override?)` (spec.md
	/// §4.4). Metadata commits first; blob replication for every file
	/// descendant follows under best-effort reporting.
	pub async fn copy_with_blobs(
		&self,
		srcs: &[NodeId],
		target_folder: NodeId,
		user: UserId,
		override_conflicts: bool,
	) -> crate::Result<CopyResult> {
		let (created, mapping) = self.store.copy(srcs, target_folder, user, override_conflicts).await?;

		let file_pairs: Vec<(String, String)> = mapping
			.iter()
			.filter(|m| matches!(m.kind, crate::NodeKind::File))
			.map(|m| {
				(
					ObjectStoreCoordinator::key_for(&m.old_path, false),
					ObjectStoreCoordinator::key_for(&m.new_path, false),
				)
			})
			.collect();

		let outcomes = self.blobs.copy_many(file_pairs).await;
		let blob_ok = outcomes.iter().filter(|o| o.is_ok()).count() as u64;
		let blob_failed = outcomes.len() as u64 - blob_ok;

		Ok(CopyResult {
			copied_count: created.len() as u64,
			blob_ok,
			blob_failed,
		})
	}

	/// `move-with-blobs(srcs[], target_folder, user, override?)` (spec.md
	/// §4.4). Copy-then-delete ordering on the blob side guarantees no
	/// destination blob is ever missing, even if the delete of the
	/// original key fails.
	pub async fn move_with_blobs(
		&self,
		srcs: &[NodeId],
		target_folder: NodeId,
		user: UserId,
		override_conflicts: bool,
	) -> crate::Result<MoveResult> {
		let mut old_paths = Vec::with_capacity(srcs.len());
		for &src in srcs {
			let row = self.store.get_file(src, user).await?;
			old_paths.push((src, row.node_path(), row.kind));
		}

		let moved = self.store.move_many(srcs, target_folder, user, override_conflicts).await?;

		let pairs: Vec<(String, String)> = old_paths
			.iter()
			.zip(moved.iter())
			.filter(|((_, _, kind), _)| matches!(kind, crate::NodeKind::File))
			.map(|((_, old_path, _), new_row)| {
				(
					ObjectStoreCoordinator::key_for(old_path, false),
					ObjectStoreCoordinator::key_for(&new_row.node_path(), false),
				)
			})
			.collect();

		let outcomes = self.blobs.move_many(pairs).await;
		let blob_ok = outcomes.iter().filter(|o| o.is_ok()).count() as u64;
		let blob_failed = outcomes.len() as u64 - blob_ok;

		Ok(MoveResult {
			moved_count: moved.len() as u64,
			blob_ok,
			blob_failed,
		})
	}

	/// `get-file(id, user)` combined with a blob fetch, for callers that
	/// want the body rather than just the metadata row.
	pub async fn get_file_with_body(&self, id: NodeId, user: UserId) -> crate::Result<(node::Model, ByteStream)> {
		let node_row = self.store.get_file(id, user).await?;
		if node_row.is_folder() {
			return Err(EngineError::InvalidObjectType(id));
		}
		let key = ObjectStoreCoordinator::key_for(&node_row.node_path(), false);
		let body = self.blobs.download(&key).await?;
		Ok((node_row, body))
	}

	pub async fn get_hierarchy(&self, start_node: NodeId, user: UserId, max_depth: u32) -> crate::Result<Option<Tree>> {
		TreeMaterialiser::new(&self.db).get_hierarchy(start_node, user, max_depth).await
	}

	pub async fn get_roots_with_hierarchy(&self, user: UserId, max_depth: u32) -> crate::Result<RootsView> {
		TreeMaterialiser::new(&self.db).get_roots_with_hierarchy(user, max_depth).await
	}

	/// `create-root(user, kind)` — a root is created once per
	/// `(user, kind)` at first access and never destroyed (spec.md §3
	/// "Lifecycles"); this wraps [`MetadataStore::create_root`] with the
	/// configured default quota.
	pub async fn ensure_root(&self, user: UserId, kind: RootKind, config: &Config) -> crate::Result<node::Model> {
		if let Some(existing) = self.store.find_owned_root(user, kind).await? {
			return Ok(existing);
		}
		self.store.create_root(user, kind, config.root_default_max_bytes).await
	}
}
