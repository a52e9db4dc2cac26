//! Transactional CRUD of tree nodes and permission rows (spec.md §4.3).
//!
//! Every mutation opens exactly one `sea_orm::DatabaseTransaction` and
//! performs the two-step placeholder-insert-then-path-update pattern
//! §4.1 mandates for id-keyed paths, the same shape `core-new`'s own
//! `operations/locations/add/action.rs` uses for inserting a location
//! row before wiring up its dependents.

use chrono::Utc;
use sea_orm::{
	ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
	QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};

use crate::db::entities::grant::{self, GrantLevel, GrantableLevel};
use crate::db::entities::node::{self, NodeKind};
use crate::db::entities::root::{self, RootKind};
use crate::error::{EngineError, NodeId, UserId};
use crate::path::NodePath;
use crate::permission::{Permission, PermissionResolver};
use crate::{DeleteResult, Result};

/// Metadata accompanying a new file node; the body itself is handled by
/// [`crate::ObjectStoreCoordinator`].
#[derive(Debug, Clone, Default)]
pub struct FileMeta {
	pub size_bytes: i64,
	pub mime_type: Option<String>,
	pub expires_at: Option<chrono::DateTime<Utc>>,
	pub metadata: Option<serde_json::Value>,
}

/// A single `(old_path, new_path, kind)` entry produced by [`MetadataStore::copy`]
/// for the object-store coordinator to replicate blob bodies against
/// (spec.md §4.3 "Copy subtree").
#[derive(Debug, Clone)]
pub struct ReplicationMapping {
	pub old_path: NodePath,
	pub new_path: NodePath,
	pub kind: NodeKind,
}

pub struct MetadataStore {
	db: DatabaseConnection,
}

impl MetadataStore {
	pub fn new(db: DatabaseConnection) -> Self {
		Self { db }
	}

	pub fn db(&self) -> &DatabaseConnection {
		&self.db
	}

	/// Looks up the root node `user` already owns of `kind`, if any.
	/// Lets a caller make `create-root` idempotent per `(user, kind)`
	/// without tripping [`EngineError::RootAlreadyExists`].
	pub async fn find_owned_root(&self, user: UserId, kind: RootKind) -> Result<Option<node::Model>> {
		let Some(root_row) = self.owned_root_row(&self.db, user, kind).await? else {
			return Ok(None);
		};
		Ok(Some(self.find_node(&self.db, root_row.root_node_id).await?))
	}

	/// `create-root(user, kind)` — new root node + owner grant.
	pub async fn create_root(&self, user: UserId, kind: RootKind, max_bytes: u64) -> Result<node::Model> {
		let txn = self.db.begin().await?;

		if matches!(kind, RootKind::Personal | RootKind::PersonalTemporary)
			&& self.owned_root_row(&txn, user, kind).await?.is_some()
		{
			return Err(EngineError::RootAlreadyExists {
				user,
				kind: root_kind_label(kind),
			});
		}

		let placeholder = node::ActiveModel {
			name: Set(root_name(kind)),
			kind: Set(NodeKind::Folder),
			path: Set(String::new()), // corrected below once the id exists
			parent_id: Set(None),
			created_at: Set(Utc::now()),
			expires_at: Set(None),
			size_bytes: Set(None),
			mime_type: Set(None),
			metadata: Set(None),
			..Default::default()
		};
		let inserted = placeholder.insert(&txn).await?;

		let mut active: node::ActiveModel = inserted.clone().into();
		active.path = Set(NodePath::root(inserted.id).encode());
		let node_row = active.update(&txn).await?;

		root::ActiveModel {
			root_node_id: Set(node_row.id),
			kind: Set(kind),
			max_storage_bytes: Set(max_bytes as i64),
			..Default::default()
		}
		.insert(&txn)
		.await?;

		grant::ActiveModel {
			user_id: Set(user),
			node_id: Set(node_row.id),
			level: Set(GrantLevel::Owner),
		}
		.insert(&txn)
		.await?;

		txn.commit().await?;
		Ok(node_row)
	}

	/// `create-folder(parent, name, user)` — requires `write` on `parent`.
	pub async fn create_folder(&self, parent: NodeId, name: &str, user: UserId) -> Result<node::Model> {
		let txn = self.db.begin().await?;
		let parent_row = self.find_parent(&txn, parent).await?;
		self.require(&txn, user, parent, Permission::Write).await?;

		self.check_name_conflict(&txn, parent, &[name.to_string()], false)
			.await?;

		let node_row = self
			.insert_child(&txn, &parent_row.node_path(), name, NodeKind::Folder, FileMeta::default())
			.await?;

		txn.commit().await?;
		Ok(node_row)
	}

	/// `upload-file(parent, name, user, body_meta)` — metadata half of
	/// the combined `upload-with-body` operation; requires `write` on
	/// `parent`. The caller (the object-store coordinator, via
	/// [`crate::Engine::upload_with_body`]) is responsible for rolling
	/// this transaction back if the blob upload itself fails.
	pub async fn upload_file(
		&self,
		txn: &impl ConnectionTrait,
		parent: NodeId,
		name: &str,
		user: UserId,
		body_meta: FileMeta,
	) -> Result<node::Model> {
		let parent_row = self.find_parent(txn, parent).await?;
		self.require(txn, user, parent, Permission::Write).await?;
		self.check_name_conflict(txn, parent, &[name.to_string()], false)
			.await?;
		self.insert_child(txn, &parent_row.node_path(), name, NodeKind::File, body_meta)
			.await
	}

	/// `get-file(id, user)` — requires `read` on `id`.
	pub async fn get_file(&self, id: NodeId, user: UserId) -> Result<node::Model> {
		self.require(&self.db, user, id, Permission::Read).await?;
		self.find_node(&self.db, id).await
	}

	/// `list-children(folder, user)` — folders first, then files, name
	/// ascending. Rows with no effective permission are elided (the
	/// caller still needs read access to the folder itself to list it;
	/// §4.2's `effective-select` is applied per-child so a partially
	/// visible folder never leaks names the caller cannot see).
	pub async fn list_children(&self, folder: NodeId, user: UserId) -> Result<Vec<(node::Model, Permission)>> {
		self.require(&self.db, user, folder, Permission::Read).await?;

		// One round trip: the per-row effective permission is computed by
		// a correlated subquery (spec.md §9 "Permission-inheritance
		// subquery") rather than a query per child.
		let fragment = PermissionResolver::<DatabaseConnection>::effective_select_fragment("$2");
		let sql = format!(
			"SELECT n.*, ({fragment}) AS effective_level \
			 FROM nodes n \
			 WHERE n.parent_id = $1 \
			 ORDER BY n.kind ASC, n.name ASC"
		);
		let stmt = Statement::from_sql_and_values(
			self.db.get_database_backend(),
			&sql,
			[folder.into(), user.into()],
		);

		let query_results = self.db.query_all(stmt).await?;
		let mut rows = Vec::with_capacity(query_results.len());
		for row in query_results {
			let Some(raw_level) = row.try_get::<Option<i16>>("", "effective_level")? else {
				continue;
			};
			let node_row = node::Model::from_query_result(&row, "")?;
			rows.push((node_row, Permission::from_ordinal(raw_level)));
		}
		Ok(rows)
	}

	/// `rename(id, name, user)` — requires `write` on `id`. Root nodes
	/// cannot be renamed (spec.md §1 root-folder immutability).
	pub async fn rename(&self, id: NodeId, name: &str, user: UserId) -> Result<node::Model> {
		let txn = self.db.begin().await?;
		self.require(&txn, user, id, Permission::Write).await?;
		if self.is_root(&txn, id).await? {
			return Err(EngineError::CannotRenameRoot(id));
		}
		let node_row = self.find_node(&txn, id).await?;
		if let Some(parent_id) = node_row.parent_id {
			self.check_name_conflict(&txn, parent_id, &[name.to_string()], false)
				.await?;
		}

		let mut active: node::ActiveModel = node_row.into();
		active.name = Set(name.to_string());
		let updated = active.update(&txn).await?;
		txn.commit().await?;
		Ok(updated)
	}

	/// `move(id, new_parent, user)` — requires `write` on `id` and on
	/// `new_parent`; rewrites the path of `id` and every descendant in a
	/// single statement per §4.3 "Move subtree".
	pub async fn move_node(&self, id: NodeId, new_parent: NodeId, user: UserId) -> Result<node::Model> {
		let txn = self.db.begin().await?;
		let moved = self.move_node_in_txn(&txn, id, new_parent, user, false).await?;
		txn.commit().await?;
		Ok(moved)
	}

	async fn move_node_in_txn(
		&self,
		txn: &impl ConnectionTrait,
		id: NodeId,
		new_parent: NodeId,
		user: UserId,
		allow_override: bool,
	) -> Result<node::Model> {
		self.require(txn, user, id, Permission::Write).await?;
		self.require(txn, user, new_parent, Permission::Write).await?;

		let node_row = self.find_node(txn, id).await?;
		if self.is_root(txn, id).await? {
			return Err(EngineError::CannotMoveRoot(id));
		}
		// Re-read the parent's path inside the mutation transaction
		// (spec.md §5: permission checks read a snapshot, the mutation
		// re-reads it to avoid acting on a stale path).
		let new_parent_row = self.find_node(txn, new_parent).await?;

		let old_path = node_row.node_path();
		let new_parent_path = new_parent_row.node_path();

		if old_path.root_id() != new_parent_path.root_id() {
			return Err(EngineError::CrossRoot {
				source: id,
				target: new_parent,
			});
		}
		if node_row.parent_id == Some(new_parent) {
			return Err(EngineError::SameFolder(new_parent));
		}

		self.check_name_conflict(txn, new_parent, &[node_row.name.clone()], allow_override)
			.await?;

		let new_path = new_parent_path.child_path(id);

		let mut active: node::ActiveModel = node_row.clone().into();
		active.path = Set(new_path.encode());
		active.parent_id = Set(Some(new_parent));
		let updated = active.update(txn).await?;

		self.rewrite_descendant_paths(txn, &old_path, &new_path).await?;

		Ok(updated)
	}

	/// For every descendant `D` of `old_path`, set
	/// `D.path := concat(new_path, subpath(D.path, level(old_path)))`.
	async fn rewrite_descendant_paths(
		&self,
		txn: &impl ConnectionTrait,
		old_path: &NodePath,
		new_path: &NodePath,
	) -> Result<()> {
		let prefix = format!("{}.%", old_path.encode());
		let descendants = node::Entity::find()
			.filter(node::Column::Path.like(prefix))
			.all(txn)
			.await?;

		for descendant in descendants {
			let suffix = descendant.node_path().subpath(old_path.level(), None);
			let rewritten = new_path.concat(&suffix);
			let direct_parent_id = if suffix.level() == 1 {
				Some(new_path.last())
			} else {
				descendant.parent_id
			};

			let mut active: node::ActiveModel = descendant.into();
			active.path = Set(rewritten.encode());
			if direct_parent_id.is_some() {
				active.parent_id = Set(direct_parent_id);
			}
			active.update(txn).await?;
		}
		Ok(())
	}

	/// `delete(id, user)` — root destruction requires `admin` on itself
	/// (owner collapses to admin except here, per §4.2 — but `owner` is
	/// never required to be anything less, so `admin` still suffices);
	/// non-root nodes require `write` on the parent. Removes the node
	/// and every descendant.
	pub async fn delete(&self, id: NodeId, user: UserId) -> Result<DeleteResult> {
		let txn = self.db.begin().await?;
		let result = self.delete_in_txn(&txn, id, user).await?;
		txn.commit().await?;
		Ok(result)
	}

	async fn delete_in_txn(&self, txn: &impl ConnectionTrait, id: NodeId, user: UserId) -> Result<DeleteResult> {
		let node_row = self.find_node(txn, id).await?;

		if self.is_root(txn, id).await? {
			self.require(txn, user, id, Permission::Admin).await?;
		} else {
			let parent_id = node_row
				.parent_id
				.ok_or(EngineError::ParentNotFound(id))?;
			self.require(txn, user, parent_id, Permission::Write).await?;
		}

		let prefix = format!("{}.%", node_row.path);
		let descendant_ids: Vec<NodeId> = node::Entity::find()
			.filter(node::Column::Path.like(prefix))
			.all(txn)
			.await?
			.into_iter()
			.map(|n| n.id)
			.collect();

		let mut meta_removed = descendant_ids.len() as u64;
		for descendant_id in descendant_ids {
			node::Entity::delete_by_id(descendant_id).exec(txn).await?;
		}
		node::Entity::delete_by_id(id).exec(txn).await?;
		meta_removed += 1;

		Ok(DeleteResult {
			meta_removed,
			blob_removed: 0,
			blob_failed: 0,
		})
	}

	/// `copy(srcs[], target_folder, user, override?)` — clones the
	/// metadata of each source subtree under `target_folder`, returning
	/// the new nodes plus the replication mapping the object-store
	/// coordinator needs to duplicate blob bodies.
	pub async fn copy(
		&self,
		srcs: &[NodeId],
		target_folder: NodeId,
		user: UserId,
		override_conflicts: bool,
	) -> Result<(Vec<node::Model>, Vec<ReplicationMapping>)> {
		let txn = self.db.begin().await?;

		self.require(&txn, user, target_folder, Permission::Write).await?;
		let target_row = self.find_node(&txn, target_folder).await?;
		let target_path = target_row.node_path();

		let mut src_rows = Vec::with_capacity(srcs.len());
		for &src in srcs {
			if self.is_root(&txn, src).await? {
				return Err(EngineError::CannotCopyRoot(src));
			}
			let row = self.find_node(&txn, src).await?;
			if row.node_path().root_id() != target_path.root_id() {
				return Err(EngineError::CrossRoot {
					source: src,
					target: target_folder,
				});
			}
			self.require_descendants_readable(&txn, user, &row).await?;
			src_rows.push(row);
		}

		let names: Vec<String> = src_rows.iter().map(|r| r.name.clone()).collect();
		self.check_name_conflict(&txn, target_folder, &names, override_conflicts)
			.await?;

		let mut created = Vec::new();
		let mut mapping = Vec::new();

		for src_row in &src_rows {
			self.copy_subtree(&txn, src_row, &target_path, target_folder, &mut created, &mut mapping)
				.await?;
		}

		txn.commit().await?;
		Ok((created, mapping))
	}

	/// Recursively clones `src` and its descendants under `new_parent_path`,
	/// ordered ancestors-first so each child can resolve its freshly
	/// allocated parent id (spec.md §4.3 "Copy subtree").
	async fn copy_subtree(
		&self,
		txn: &impl ConnectionTrait,
		src: &node::Model,
		new_parent_path: &NodePath,
		new_parent_id: NodeId,
		created: &mut Vec<node::Model>,
		mapping: &mut Vec<ReplicationMapping>,
	) -> Result<()> {
		let meta = FileMeta {
			size_bytes: src.size_bytes.unwrap_or(0),
			mime_type: src.mime_type.clone(),
			expires_at: src.expires_at,
			metadata: src.metadata.clone(),
		};
		let new_node = self
			.insert_child(txn, new_parent_path, &src.name, src.kind, meta)
			.await?;

		mapping.push(ReplicationMapping {
			old_path: src.node_path(),
			new_path: new_node.node_path(),
			kind: src.kind,
		});

		let children = node::Entity::find()
			.filter(node::Column::ParentId.eq(src.id))
			.all(txn)
			.await?;

		let new_node_path = new_node.node_path();
		created.push(new_node);

		for child in children {
			Box::pin(self.copy_subtree(txn, &child, &new_node_path, new_parent_id, created, mapping)).await?;
		}
		Ok(())
	}

	/// `move-many(srcs[], target_folder, user, override?)`.
	pub async fn move_many(
		&self,
		srcs: &[NodeId],
		target_folder: NodeId,
		user: UserId,
		override_conflicts: bool,
	) -> Result<Vec<node::Model>> {
		let txn = self.db.begin().await?;

		self.require(&txn, user, target_folder, Permission::Write).await?;
		let target_row = self.find_node(&txn, target_folder).await?;
		let target_root = target_row.node_path().root_id();

		for &src in srcs {
			if self.is_root(&txn, src).await? {
				return Err(EngineError::CannotMoveRoot(src));
			}
			let src_row = self.find_node(&txn, src).await?;
			if src_row.node_path().root_id() != target_root {
				return Err(EngineError::CrossRoot {
					source: src,
					target: target_folder,
				});
			}
			self.require_descendants_writable(&txn, user, &src_row).await?;
		}

		let mut moved = Vec::with_capacity(srcs.len());
		for &src in srcs {
			moved.push(
				self.move_node_in_txn(&txn, src, target_folder, user, override_conflicts)
					.await?,
			);
		}

		txn.commit().await?;
		Ok(moved)
	}

	/// `grant(target_user, node, level, actor)` — actor must hold
	/// `admin` on `node`; no-op if `target_user` already has `>= level`
	/// via ancestor inheritance.
	pub async fn grant(
		&self,
		target_user: UserId,
		node_id: NodeId,
		level: GrantableLevel,
		actor: UserId,
	) -> Result<()> {
		let txn = self.db.begin().await?;
		self.require(&txn, actor, node_id, Permission::Admin).await?;

		let resolver = PermissionResolver::new(&txn);
		let requested = Permission::from(GrantLevel::from(level));
		if let Some(existing) = resolver.effective(target_user, node_id).await? {
			if existing.as_capability() >= requested {
				txn.commit().await?;
				return Ok(());
			}
		}

		grant::Entity::delete_many()
			.filter(grant::Column::UserId.eq(target_user))
			.filter(grant::Column::NodeId.eq(node_id))
			.exec(&txn)
			.await?;
		grant::ActiveModel {
			user_id: Set(target_user),
			node_id: Set(node_id),
			level: Set(level.into()),
		}
		.insert(&txn)
		.await?;

		txn.commit().await?;
		Ok(())
	}

	/// `revoke(target_user, node, actor)` — actor must hold `admin` on `node`.
	pub async fn revoke(&self, target_user: UserId, node_id: NodeId, actor: UserId) -> Result<()> {
		let txn = self.db.begin().await?;
		self.require(&txn, actor, node_id, Permission::Admin).await?;
		grant::Entity::delete_many()
			.filter(grant::Column::UserId.eq(target_user))
			.filter(grant::Column::NodeId.eq(node_id))
			.exec(&txn)
			.await?;
		txn.commit().await?;
		Ok(())
	}

	/// `list-grants(node, user)` — user must hold `admin` on `node`.
	/// Aggregates the highest-per-user grant from `node` up to its root.
	pub async fn list_grants(&self, node_id: NodeId, user: UserId) -> Result<Vec<(UserId, Permission)>> {
		self.require(&self.db, user, node_id, Permission::Admin).await?;

		let node_row = self.find_node(&self.db, node_id).await?;
		let ancestor_ids = node_row.node_path().segments().to_vec();

		let grants = grant::Entity::find()
			.filter(grant::Column::NodeId.is_in(ancestor_ids))
			.find_also_related(node::Entity)
			.all(&self.db)
			.await?;

		let mut highest: std::collections::HashMap<UserId, Permission> = std::collections::HashMap::new();
		for (g, _) in grants {
			let level = Permission::from(g.level);
			highest
				.entry(g.user_id)
				.and_modify(|current| {
					if level > *current {
						*current = level;
					}
				})
				.or_insert(level);
		}
		Ok(highest.into_iter().collect())
	}

	// --- helpers ---

	async fn require(
		&self,
		db: &impl ConnectionTrait,
		user: UserId,
		node_id: NodeId,
		required: Permission,
	) -> Result<()> {
		let resolver = PermissionResolver::new(db);
		match resolver.effective(user, node_id).await? {
			Some(level) if level.at_least(required) => Ok(()),
			_ => Err(EngineError::NoPermission { user, node: node_id }),
		}
	}

	async fn require_descendants_readable(
		&self,
		db: &impl ConnectionTrait,
		user: UserId,
		root: &node::Model,
	) -> Result<()> {
		let prefix = format!("{}.%", root.path);
		let ids: Vec<NodeId> = node::Entity::find()
			.filter(node::Column::Path.like(prefix))
			.all(db)
			.await?
			.into_iter()
			.map(|n| n.id)
			.chain(std::iter::once(root.id))
			.collect();

		let resolver = PermissionResolver::new(db);
		for id in ids {
			match resolver.effective(user, id).await? {
				Some(level) if level.at_least(Permission::Read) => {}
				_ => return Err(EngineError::NoPermissionOnSource { user, node: id }),
			}
		}
		Ok(())
	}

	async fn require_descendants_writable(
		&self,
		db: &impl ConnectionTrait,
		user: UserId,
		root: &node::Model,
	) -> Result<()> {
		let prefix = format!("{}.%", root.path);
		let ids: Vec<NodeId> = node::Entity::find()
			.filter(node::Column::Path.like(prefix))
			.all(db)
			.await?
			.into_iter()
			.map(|n| n.id)
			.chain(std::iter::once(root.id))
			.collect();

		let resolver = PermissionResolver::new(db);
		for id in ids {
			match resolver.effective(user, id).await? {
				Some(level) if level.at_least(Permission::Write) => {}
				_ => return Err(EngineError::NoPermissionOnDescendants { user, node: id }),
			}
		}
		Ok(())
	}

	async fn find_node(&self, db: &impl ConnectionTrait, id: NodeId) -> Result<node::Model> {
		node::Entity::find_by_id(id)
			.one(db)
			.await?
			.ok_or(EngineError::ObjectNotFound(id))
	}

	/// Like [`Self::find_node`], but reports a missing row as
	/// `parent-not-found` — the error spec.md §4.3 names for
	/// `create-folder`/`upload-file` rather than the generic
	/// `object-not-found`.
	async fn find_parent(&self, db: &impl ConnectionTrait, id: NodeId) -> Result<node::Model> {
		node::Entity::find_by_id(id)
			.one(db)
			.await?
			.ok_or(EngineError::ParentNotFound(id))
	}

	/// The root row `user` already owns of `kind`, via their `Owner`
	/// grant on its root node, if any. `grant::Entity` has no
	/// `Related<root::Entity>` impl, so this joins through `node_id`
	/// explicitly.
	async fn owned_root_row(
		&self,
		db: &impl ConnectionTrait,
		user: UserId,
		kind: RootKind,
	) -> Result<Option<root::Model>> {
		let owned_node_ids: Vec<NodeId> = grant::Entity::find()
			.filter(grant::Column::UserId.eq(user))
			.filter(grant::Column::Level.eq(GrantLevel::Owner))
			.all(db)
			.await?
			.into_iter()
			.map(|g| g.node_id)
			.collect();

		Ok(root::Entity::find()
			.filter(root::Column::RootNodeId.is_in(owned_node_ids))
			.filter(root::Column::Kind.eq(kind))
			.one(db)
			.await?)
	}

	async fn is_root(&self, db: &impl ConnectionTrait, id: NodeId) -> Result<bool> {
		let found = root::Entity::find()
			.filter(root::Column::RootNodeId.eq(id))
			.one(db)
			.await?;
		Ok(found.is_some())
	}

	/// Name-conflict detection (spec.md §4.3): direct children of
	/// `parent` whose name is in `candidates`. With `override=true`, the
	/// conflicting subtrees are deleted within the same transaction
	/// before the caller proceeds.
	async fn check_name_conflict(
		&self,
		db: &impl ConnectionTrait,
		parent: NodeId,
		candidates: &[String],
		allow_override: bool,
	) -> Result<()> {
		let conflicts = node::Entity::find()
			.filter(node::Column::ParentId.eq(parent))
			.filter(node::Column::Name.is_in(candidates.to_vec()))
			.all(db)
			.await?;

		if conflicts.is_empty() {
			return Ok(());
		}
		if !allow_override {
			return Err(EngineError::NameAlreadyExists {
				parent,
				conflicting_name: conflicts[0].name.clone(),
			});
		}

		for conflict in conflicts {
			let prefix = format!("{}.%", conflict.path);
			let descendant_ids: Vec<NodeId> = node::Entity::find()
				.filter(node::Column::Path.like(prefix))
				.all(db)
				.await?
				.into_iter()
				.map(|n| n.id)
				.collect();
			for id in descendant_ids {
				node::Entity::delete_by_id(id).exec(db).await?;
			}
			node::Entity::delete_by_id(conflict.id).exec(db).await?;
		}
		Ok(())
	}

	/// Placeholder-insert-then-path-update (spec.md §4.1): the id is
	/// only known after the first insert, so the path column is
	/// corrected in a second write within the same transaction.
	async fn insert_child(
		&self,
		db: &impl ConnectionTrait,
		parent_path: &NodePath,
		name: &str,
		kind: NodeKind,
		meta: FileMeta,
	) -> Result<node::Model> {
		let placeholder = node::ActiveModel {
			name: Set(name.to_string()),
			kind: Set(kind),
			path: Set(String::new()),
			parent_id: Set(Some(parent_path.last())),
			created_at: Set(Utc::now()),
			expires_at: Set(meta.expires_at),
			size_bytes: Set(if matches!(kind, NodeKind::File) {
				Some(meta.size_bytes)
			} else {
				None
			}),
			mime_type: Set(meta.mime_type),
			metadata: Set(meta.metadata),
			..Default::default()
		};
		let inserted = placeholder.insert(db).await?;

		let new_path = parent_path.child_path(inserted.id);
		let mut active: node::ActiveModel = inserted.into();
		active.path = Set(new_path.encode());
		Ok(active.update(db).await?)
	}
}

fn root_name(kind: RootKind) -> String {
	root_kind_label(kind).to_string()
}

fn root_kind_label(kind: RootKind) -> &'static str {
	match kind {
		RootKind::Personal => "personal",
		RootKind::PersonalTemporary => "personal-temporary",
		RootKind::Organisational => "organisational",
	}
}
