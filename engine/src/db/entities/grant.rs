//! Permission grant entity — a `(user_id, node_id) -> level` record.
//! See `spec.md` §3 and [`crate::permission`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grants")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub user_id: Uuid,
	#[sea_orm(primary_key, auto_increment = false)]
	pub node_id: i64,
	pub level: GrantLevel,
}

/// The full ordinal range a grant row may hold. `Owner` is only ever
/// written by `create-root`; [`GrantableLevel`] is the type `share`/
/// `grant` actually accept, making "grant refuses owner" a property of
/// the type system rather than a runtime check (spec.md §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
pub enum GrantLevel {
	#[sea_orm(num_value = 0)]
	Read,
	#[sea_orm(num_value = 1)]
	Write,
	#[sea_orm(num_value = 2)]
	Admin,
	#[sea_orm(num_value = 3)]
	Owner,
}

/// The levels `share`/`grant` may assign. Does not include `Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GrantableLevel {
	Read,
	Write,
	Admin,
}

impl From<GrantableLevel> for GrantLevel {
	fn from(level: GrantableLevel) -> Self {
		match level {
			GrantableLevel::Read => Self::Read,
			GrantableLevel::Write => Self::Write,
			GrantableLevel::Admin => Self::Admin,
		}
	}
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::node::Entity",
		from = "Column::NodeId",
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

impl From<GrantLevel> for crate::permission::Permission {
	fn from(level: GrantLevel) -> Self {
		match level {
			GrantLevel::Read => Self::Read,
			GrantLevel::Write => Self::Write,
			GrantLevel::Admin => Self::Admin,
			GrantLevel::Owner => Self::Owner,
		}
	}
}
