//! Chunk entity — storage only. Consumed by an external RAG
//! collaborator (spec.md §6); the engine's only responsibility toward
//! it is cascading the delete when the owning node is removed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chunks")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	pub node_id: i64,
	pub content: String,
	pub metadata: Option<serde_json::Value>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::node::Entity",
		from = "Column::NodeId",
		to = "super::node::Column::Id",
		on_delete = "Cascade"
	)]
	Node,
}

impl Related<super::node::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Node.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
