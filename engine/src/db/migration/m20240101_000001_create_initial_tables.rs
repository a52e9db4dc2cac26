//! Creates the engine's four tables (spec.md §6 "Persistence layout"):
//! `nodes`, `roots`, `grants`, `chunks`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(Nodes::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(Nodes::Id)
							.big_integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(ColumnDef::new(Nodes::Name).text().not_null())
					.col(ColumnDef::new(Nodes::Kind).small_integer().not_null())
					.col(ColumnDef::new(Nodes::Path).text().not_null())
					.col(ColumnDef::new(Nodes::ParentId).big_integer().null())
					.col(
						ColumnDef::new(Nodes::CreatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.col(
						ColumnDef::new(Nodes::ExpiresAt)
							.timestamp_with_time_zone()
							.null(),
					)
					.col(ColumnDef::new(Nodes::SizeBytes).big_integer().null())
					.col(ColumnDef::new(Nodes::MimeType).text().null())
					.col(ColumnDef::new(Nodes::Metadata).json_binary().null())
					.foreign_key(
						ForeignKey::create()
							.name("fk_nodes_parent_id")
							.from(Nodes::Table, Nodes::ParentId)
							.to(Nodes::Table, Nodes::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.to_owned(),
			)
			.await?;

		// Prefix queries (ancestor/descendant predicates) run as `path LIKE
		// 'prefix.%'`; a plain b-tree index on `path` serves both the
		// equality and prefix-range forms Postgres can derive from LIKE
		// without wildcards at the start.
		manager
			.create_index(
				Index::create()
					.name("idx_nodes_path")
					.table(Nodes::Table)
					.col(Nodes::Path)
					.to_owned(),
			)
			.await?;
		manager
			.create_index(
				Index::create()
					.name("idx_nodes_parent_id")
					.table(Nodes::Table)
					.col(Nodes::ParentId)
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(Roots::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(Roots::Id)
							.big_integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(ColumnDef::new(Roots::RootNodeId).big_integer().not_null())
					.col(ColumnDef::new(Roots::Kind).small_integer().not_null())
					.col(
						ColumnDef::new(Roots::MaxStorageBytes)
							.big_integer()
							.not_null(),
					)
					.foreign_key(
						ForeignKey::create()
							.name("fk_roots_root_node_id")
							.from(Roots::Table, Roots::RootNodeId)
							.to(Nodes::Table, Nodes::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(Grants::Table)
					.if_not_exists()
					.col(ColumnDef::new(Grants::UserId).uuid().not_null())
					.col(ColumnDef::new(Grants::NodeId).big_integer().not_null())
					.col(ColumnDef::new(Grants::Level).small_integer().not_null())
					.primary_key(
						Index::create()
							.col(Grants::UserId)
							.col(Grants::NodeId),
					)
					.foreign_key(
						ForeignKey::create()
							.name("fk_grants_node_id")
							.from(Grants::Table, Grants::NodeId)
							.to(Nodes::Table, Nodes::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.to_owned(),
			)
			.await?;
		manager
			.create_index(
				Index::create()
					.name("idx_grants_node_id")
					.table(Grants::Table)
					.col(Grants::NodeId)
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(Chunks::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(Chunks::Id)
							.big_integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(ColumnDef::new(Chunks::NodeId).big_integer().not_null())
					.col(ColumnDef::new(Chunks::Content).text().not_null())
					.col(ColumnDef::new(Chunks::Metadata).json_binary().null())
					.foreign_key(
						ForeignKey::create()
							.name("fk_chunks_node_id")
							.from(Chunks::Table, Chunks::NodeId)
							.to(Nodes::Table, Nodes::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.to_owned(),
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(Chunks::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(Grants::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(Roots::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(Nodes::Table).to_owned())
			.await?;
		Ok(())
	}
}

#[derive(DeriveIden)]
enum Nodes {
	Table,
	Id,
	Name,
	Kind,
	Path,
	ParentId,
	CreatedAt,
	ExpiresAt,
	SizeBytes,
	MimeType,
	Metadata,
}

#[derive(DeriveIden)]
enum Roots {
	Table,
	Id,
	RootNodeId,
	Kind,
	MaxStorageBytes,
}

#[derive(DeriveIden)]
enum Grants {
	Table,
	UserId,
	NodeId,
	Level,
}

#[derive(DeriveIden)]
enum Chunks {
	Table,
	Id,
	NodeId,
	Content,
	Metadata,
}
