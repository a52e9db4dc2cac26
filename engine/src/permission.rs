//! Effective-permission resolver (spec.md §4.2).
//!
//! Combines ancestor inheritance (the deepest ancestor grant wins, even
//! if shallower grants are higher) with descendant-derived visibility
//! (any grant on a descendant makes the target at least readable, so a
//! user can traverse toward what they hold). Styled after the
//! deepest-wins radix-tree walk in `hermes-bin`'s own VFS permission
//! module (`vfs/permission.rs` in the reference pack), generalised from
//! a path-string tree to the id-path tree this engine uses, and backed
//! by Postgres instead of an in-process tree.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::db::entities::{grant, node};
use crate::error::{EngineError, NodeId, UserId};
use crate::path::NodePath;

/// A resolved effective permission level, ordered `Read < Write < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Permission {
	Read,
	Write,
	Admin,
	Owner,
}

impl Permission {
	/// `owner` collapses to `admin` for every capability check except
	/// root-folder destruction (spec.md §4.2).
	pub fn as_capability(self) -> Self {
		match self {
			Self::Owner => Self::Admin,
			other => other,
		}
	}

	pub fn at_least(self, required: Self) -> bool {
		self.as_capability() >= required
	}

	/// Inverse of [`PermissionResolver::effective_select_fragment`]'s
	/// `0..=3` ordinal encoding.
	pub fn from_ordinal(value: i16) -> Self {
		match value {
			0 => Self::Read,
			1 => Self::Write,
			2 => Self::Admin,
			_ => Self::Owner,
		}
	}
}

pub struct PermissionResolver<'a, C: ConnectionTrait> {
	db: &'a C,
}

impl<'a, C: ConnectionTrait> PermissionResolver<'a, C> {
	pub fn new(db: &'a C) -> Self {
		Self { db }
	}

	/// `effective(user, node) -> {None, read, write, admin, owner}` (spec.md §4.2).
	pub async fn effective(
		&self,
		user: UserId,
		node_id: NodeId,
	) -> crate::Result<Option<Permission>> {
		let target = node::Entity::find_by_id(node_id)
			.one(self.db)
			.await?
			.ok_or(EngineError::ObjectNotFound(node_id))?;
		let target_path = target.node_path();

		if let Some(level) = self.deepest_ancestor_grant(user, &target_path).await? {
			return Ok(Some(level));
		}

		if self.has_descendant_grant(user, &target_path).await? {
			return Ok(Some(Permission::Read));
		}

		Ok(None)
	}

	/// The deepest ancestor grant for `user` on any prefix of `path`
	/// (including `path` itself). Ties cannot occur: grants are keyed by
	/// node, and a path has at most one node per depth.
	async fn deepest_ancestor_grant(
		&self,
		user: UserId,
		path: &NodePath,
	) -> crate::Result<Option<Permission>> {
		let ancestor_ids = path.segments().to_vec();

		let mut rows = grant::Entity::find()
			.filter(grant::Column::UserId.eq(user))
			.filter(grant::Column::NodeId.is_in(ancestor_ids))
			.find_also_related(node::Entity)
			.all(self.db)
			.await?;

		// Deepest ancestor wins regardless of level (spec.md §4.2 tie-break).
		rows.sort_by_key(|(_, node)| {
			node.as_ref()
				.map(|n| n.node_path().level())
				.unwrap_or(0)
		});

		Ok(rows
			.into_iter()
			.next_back()
			.map(|(g, _)| Permission::from(g.level)))
	}

	/// `true` if any descendant of `path` carries a grant for `user`.
	async fn has_descendant_grant(&self, user: UserId, path: &NodePath) -> crate::Result<bool> {
		let prefix = format!("{}.%", path.encode());

		let found = grant::Entity::find()
			.filter(grant::Column::UserId.eq(user))
			.inner_join(node::Entity)
			.filter(node::Column::Path.like(prefix))
			.order_by_asc(grant::Column::NodeId)
			.one(self.db)
			.await?;

		Ok(found.is_some())
	}

	/// `min-effective(user, nodes[]) -> level | None` (spec.md §4.2).
	/// Returns the lowest effective level across the union of the given
	/// nodes and every one of their descendants; `None` if any element
	/// of that union is unreadable.
	pub async fn min_effective(
		&self,
		user: UserId,
		nodes: &[NodeId],
	) -> crate::Result<Option<Permission>> {
		let mut union_ids = Vec::new();
		for &id in nodes {
			union_ids.push(id);
			let target = node::Entity::find_by_id(id)
				.one(self.db)
				.await?
				.ok_or(EngineError::ObjectNotFound(id))?;
			let prefix = format!("{}.%", target.path);
			let descendants = node::Entity::find()
				.filter(node::Column::Path.like(prefix))
				.all(self.db)
				.await?;
			union_ids.extend(descendants.into_iter().map(|d| d.id));
		}
		union_ids.sort_unstable();
		union_ids.dedup();

		let mut min: Option<Permission> = None;
		for id in union_ids {
			match self.effective(user, id).await? {
				Some(level) => {
					min = Some(match min {
						Some(current) => current.min(level),
						None => level,
					});
				}
				None => return Ok(None),
			}
		}
		Ok(min)
	}

	/// The parameterised SQL fragment computing a per-row effective
	/// permission, for embedding in listing queries (as a correlated
	/// subquery against an outer alias `n`) so that a folder listing and
	/// its members' permissions cost one round-trip rather than O(N)
	/// (spec.md §9 "Permission-inheritance subquery"). `user_param` is
	/// the `$N` placeholder the caller bound the user id to.
	///
	/// Evaluates to `NULL` for rows with no effective permission,
	/// otherwise one of `0..=3` matching [`Permission`]'s ordinal
	/// encoding (ancestor-deepest-wins, falling back to the `0` = `Read`
	/// descendant-visibility rule).
	pub fn effective_select_fragment(user_param: &str) -> String {
		format!(
			"COALESCE(
				(SELECT g.level
				 FROM grants g JOIN nodes anc ON anc.id = g.node_id
				 WHERE g.user_id = {user}
				   AND (n.path = anc.path OR n.path LIKE anc.path || '.%')
				 ORDER BY array_length(string_to_array(anc.path, '.'), 1) DESC
				 LIMIT 1),
				(SELECT 0
				 FROM grants g2 JOIN nodes d ON d.id = g2.node_id
				 WHERE g2.user_id = {user}
				   AND d.path LIKE n.path || '.%'
				 LIMIT 1)
			)",
			user = user_param
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn as_capability_collapses_owner_to_admin() {
		assert_eq!(Permission::Owner.as_capability(), Permission::Admin);
		assert_eq!(Permission::Admin.as_capability(), Permission::Admin);
	}

	#[test]
	fn ordering_matches_spec() {
		assert!(Permission::Read < Permission::Write);
		assert!(Permission::Write < Permission::Admin);
		assert!(Permission::Admin < Permission::Owner);
	}

	#[test]
	fn at_least_respects_owner_collapse() {
		assert!(Permission::Owner.at_least(Permission::Admin));
		assert!(!Permission::Write.at_least(Permission::Admin));
	}

	#[test]
	fn effective_select_fragment_binds_the_given_placeholder() {
		let sql = PermissionResolver::<sea_orm::DatabaseConnection>::effective_select_fragment("$2");
		assert!(sql.contains("$2"));
		assert!(sql.contains("grants g"));
	}
}
