//! Tree materialiser (spec.md §4.5): depth-bounded hierarchy fetch with
//! per-row effective-permission filtering, and the three-way root fan-out
//! consumed by a client's "my files" landing view.

use futures_concurrency::future::Join;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::db::entities::{grant, node, root};
use crate::db::Database;
use crate::error::{EngineError, NodeId, UserId};
use crate::permission::{Permission, PermissionResolver};

/// A single materialised node plus its resolved permission and, for
/// folders, its fetched (or elided) children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
	pub node: node::Model,
	/// `None` when the user has no effective permission on this node at
	/// all — only possible for an organisational root surfaced as an
	/// inaccessible leaf (spec.md §4.5); every other `Tree` is only ever
	/// constructed once `effective()` has resolved to `Some`.
	pub permission: Option<Permission>,
	/// `None` = unloaded (depth cutoff or inaccessible), `Some(vec![])` =
	/// loaded-and-empty, `Some(children)` = populated (spec.md §4.5).
	pub children: Option<Vec<Tree>>,
}

/// `get-roots-with-hierarchy` result (spec.md §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootsView {
	pub personal: Option<Tree>,
	pub organisational: Vec<Tree>,
	pub shared: Vec<Tree>,
}

pub struct TreeMaterialiser<'a> {
	db: &'a Database,
}

impl<'a> TreeMaterialiser<'a> {
	pub fn new(db: &'a Database) -> Self {
		Self { db }
	}

	/// `get-hierarchy(start_node, user, max_depth) -> Tree | None`.
	pub async fn get_hierarchy(&self, start_node: NodeId, user: UserId, max_depth: u32) -> crate::Result<Option<Tree>> {
		let resolver = PermissionResolver::new(self.db.conn());
		let Some(permission) = resolver.effective(user, start_node).await? else {
			return Ok(None);
		};
		let start_row = node::Entity::find_by_id(start_node)
			.one(self.db.conn())
			.await?
			.ok_or(EngineError::ObjectNotFound(start_node))?;

		Ok(Some(self.fetch_subtree(start_row, permission, user, 0, max_depth).await?))
	}

	/// Recursively fetches `row`'s children up to `max_depth`, pruning
	/// rows with no effective permission (spec.md §4.5).
	async fn fetch_subtree(
		&self,
		row: node::Model,
		permission: Permission,
		user: UserId,
		depth: u32,
		max_depth: u32,
	) -> crate::Result<Tree> {
		if row.is_file() || depth >= max_depth {
			return Ok(Tree {
				node: row,
				permission: Some(permission),
				children: None,
			});
		}

		let rows = node::Entity::find()
			.filter(node::Column::ParentId.eq(row.id))
			.order_by_asc(node::Column::Kind)
			.order_by_asc(node::Column::Name)
			.all(self.db.conn())
			.await?;

		let resolver = PermissionResolver::new(self.db.conn());
		let mut children = Vec::with_capacity(rows.len());
		for child in rows {
			if let Some(child_permission) = resolver.effective(user, child.id).await? {
				children.push(Box::pin(self.fetch_subtree(child, child_permission, user, depth + 1, max_depth)).await?);
			}
		}

		Ok(Tree {
			node: row,
			permission: Some(permission),
			children: Some(children),
		})
	}

	/// `get-roots-with-hierarchy(user, max_depth)`. Personal,
	/// organisational, and shared fan-outs are issued concurrently
	/// (capped by the shared connection pool) via `futures-concurrency`'s
	/// `Join`, the same combinator the path-algebra-adjacent modules of
	/// the teacher reach for instead of hand-rolled `tokio::join!` when
	/// the arity is dynamic.
	pub async fn get_roots_with_hierarchy(&self, user: UserId, max_depth: u32) -> crate::Result<RootsView> {
		let (personal, organisational, shared) = (
			self.personal_root(user, max_depth),
			self.organisational_roots(user, max_depth),
			self.shared_subtrees(user, max_depth),
		)
			.join()
			.await;

		Ok(RootsView {
			personal: personal?,
			organisational: organisational?,
			shared: shared?,
		})
	}

	async fn personal_root(&self, user: UserId, max_depth: u32) -> crate::Result<Option<Tree>> {
		let Some(owned) = self.find_own_personal_root(user).await? else {
			return Ok(None);
		};
		self.get_hierarchy(owned.root_node_id, user, max_depth).await
	}

	/// Looks up `user`'s own personal root. `grant::Entity` has no
	/// `Related<root::Entity>` impl (grants join to nodes, roots join to
	/// nodes, but not to each other directly), so this goes through
	/// `node_id` explicitly rather than a `find_also_related` call.
	async fn find_own_personal_root(&self, user: UserId) -> crate::Result<Option<root::Model>> {
		let granted_node_ids: Vec<NodeId> = grant::Entity::find()
			.filter(grant::Column::UserId.eq(user))
			.all(self.db.conn())
			.await?
			.into_iter()
			.map(|g| g.node_id)
			.collect();

		Ok(root::Entity::find()
			.filter(root::Column::RootNodeId.is_in(granted_node_ids))
			.filter(root::Column::Kind.eq(root::RootKind::Personal))
			.one(self.db.conn())
			.await?)
	}

	/// Organisational roots the user can see at all; inaccessible ones
	/// are represented as a leaf with `children: None` rather than
	/// omitted, matching spec.md §4.5's "inaccessible roots represented
	/// as leaf-with-null-children".
	async fn organisational_roots(&self, user: UserId, max_depth: u32) -> crate::Result<Vec<Tree>> {
		let org_roots = root::Entity::find()
			.filter(root::Column::Kind.eq(root::RootKind::Organisational))
			.all(self.db.conn())
			.await?;

		let resolver = PermissionResolver::new(self.db.conn());
		let mut trees = Vec::with_capacity(org_roots.len());
		for r in org_roots {
			let node_row = node::Entity::find_by_id(r.root_node_id)
				.one(self.db.conn())
				.await?
				.ok_or(EngineError::ObjectNotFound(r.root_node_id))?;
			match resolver.effective(user, r.root_node_id).await? {
				Some(permission) => {
					trees.push(
						self.fetch_subtree(node_row, permission, user, 0, max_depth).await?,
					);
				}
				None => trees.push(Tree {
					node: node_row,
					permission: None,
					children: None,
				}),
			}
		}
		Ok(trees)
	}

	/// Subtrees rooted at each node directly granted to `user` that
	/// lives under a *different* user's personal root (spec.md §4.5
	/// "shared").
	async fn shared_subtrees(&self, user: UserId, max_depth: u32) -> crate::Result<Vec<Tree>> {
		let direct_grants = grant::Entity::find()
			.filter(grant::Column::UserId.eq(user))
			.all(self.db.conn())
			.await?;

		let own_personal_root_id = self
			.find_own_personal_root(user)
			.await?
			.map(|r| r.root_node_id);

		let personal_root_node_ids: std::collections::HashSet<NodeId> = root::Entity::find()
			.filter(root::Column::Kind.eq(root::RootKind::Personal))
			.all(self.db.conn())
			.await?
			.into_iter()
			.map(|r| r.root_node_id)
			.collect();

		let mut trees = Vec::new();
		for g in direct_grants {
			let node_row = node::Entity::find_by_id(g.node_id)
				.one(self.db.conn())
				.await?
				.ok_or(EngineError::ObjectNotFound(g.node_id))?;
			let root_id = node_row.node_path().root_id();

			let under_someone_elses_personal_root =
				personal_root_node_ids.contains(&root_id) && Some(root_id) != own_personal_root_id;

			if under_someone_elses_personal_root {
				if let Some(tree) = self.get_hierarchy(g.node_id, user, max_depth).await? {
					trees.push(tree);
				}
			}
		}
		Ok(trees)
	}
}
