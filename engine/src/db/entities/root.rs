//! Root entity — the anchor of a namespace (personal, personal-temporary,
//! organisational). See `spec.md` §3.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roots")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	pub root_node_id: i64,
	pub kind: RootKind,
	pub max_storage_bytes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
pub enum RootKind {
	#[sea_orm(num_value = 0)]
	Personal,
	#[sea_orm(num_value = 1)]
	PersonalTemporary,
	#[sea_orm(num_value = 2)]
	Organisational,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::node::Entity",
		from = "Column::RootNodeId",
		to = "super::node::Column::Id"
	)]
	Node,
}

impl Related<super::node::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Node.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
