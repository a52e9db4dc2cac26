//! Node entity — a single file or folder with a materialised path.
//!
//! Mirrors the shape of `core-new`'s own `entry::Model`
//! (`infrastructure/database/entities/entry.rs`): an integer primary
//! key plus denormalised convenience columns layered on top of the
//! source of truth (`path` here; `relative_path` there).

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nodes")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	pub name: String,
	pub kind: NodeKind,
	/// Canonical `id0.id1…idn` encoding; indexed for prefix queries.
	pub path: String,
	/// Denormalised `path[len-2]`, `None` for roots. Source of truth is
	/// `path`; this column only accelerates direct-children lookups.
	pub parent_id: Option<i64>,
	pub created_at: DateTime<Utc>,
	pub expires_at: Option<DateTime<Utc>>,
	pub size_bytes: Option<i64>,
	pub mime_type: Option<String>,
	pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
pub enum NodeKind {
	#[sea_orm(num_value = 0)]
	Folder,
	#[sea_orm(num_value = 1)]
	File,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(has_many = "super::grant::Entity")]
	Grant,
	#[sea_orm(has_many = "super::chunk::Entity")]
	Chunk,
}

impl Related<super::grant::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Grant.def()
	}
}

impl Related<super::chunk::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Chunk.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	pub fn is_file(&self) -> bool {
		matches!(self.kind, NodeKind::File)
	}

	pub fn is_folder(&self) -> bool {
		matches!(self.kind, NodeKind::Folder)
	}

	pub fn node_path(&self) -> crate::path::NodePath {
		crate::path::NodePath::decode(&self.path).expect("stored path is always well-formed")
	}
}
