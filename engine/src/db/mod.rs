//! Database infrastructure: a pooled Postgres connection plus
//! migrations, following the shape of `core-new`'s own
//! `infrastructure/database/mod.rs` (which configures a SQLite
//! `ConnectOptions` the same way) adapted to Postgres per `spec.md` §6.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

pub mod entities;
pub mod migration;

/// Owns the engine's connection pool. Cloning is cheap (the underlying
/// `DatabaseConnection` is a handle around a pool).
#[derive(Clone)]
pub struct Database {
	conn: DatabaseConnection,
}

impl Database {
	/// Connect using the pool sizing from [`crate::config::Config`]
	/// (spec.md §5: "one DB connection pool, ≥20 connections for the
	/// bulk seeder, ≥5 otherwise").
	pub async fn connect(db_url: &str, pool_max: u32) -> Result<Self, DbErr> {
		let mut opt = ConnectOptions::new(db_url);
		opt.max_connections(pool_max.max(5))
			.min_connections(1)
			.connect_timeout(Duration::from_secs(8))
			.idle_timeout(Duration::from_secs(60))
			.sqlx_logging(false); // tracing covers this instead

		let conn = SeaDatabase::connect(opt).await?;
		info!(pool_max, "connected to engine database");
		Ok(Self { conn })
	}

	pub async fn migrate(&self) -> Result<(), DbErr> {
		migration::Migrator::up(&self.conn, None).await?;
		info!("engine database migrations completed");
		Ok(())
	}

	pub fn conn(&self) -> &DatabaseConnection {
		&self.conn
	}
}
