//! Hierarchical, permission-aware virtual filesystem engine.
//!
//! Overlays a Postgres metadata store (a materialised-path tree) and an
//! S3-compatible object store (file bodies). See `SPEC_FULL.md` at the
//! repository root for the full requirements this crate implements.

pub mod config;
pub mod db;
pub mod error;
pub mod path;
pub mod permission;

mod blob;
mod engine;
mod store;
mod tree;

pub use blob::{BlobOutcome, ObjectStoreCoordinator};
pub use config::{init_tracing, Config};
pub use engine::Engine;
pub use error::EngineError;
pub use path::NodePath;
pub use permission::{Permission, PermissionResolver};
pub use store::{FileMeta, MetadataStore, ReplicationMapping};
pub use tree::{RootsView, Tree, TreeMaterialiser};

pub use db::entities::{grant, node, root};
pub use db::entities::node::NodeKind;
pub use db::entities::root::RootKind;

/// Result type returned by every public operation in this crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// `copy` result record (spec.md §6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CopyResult {
	pub copied_count: u64,
	pub blob_ok: u64,
	pub blob_failed: u64,
}

/// `move`/`move-many` result record (spec.md §6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MoveResult {
	pub moved_count: u64,
	pub blob_ok: u64,
	pub blob_failed: u64,
}

/// `delete`/`delete-with-blobs` result record (spec.md §6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeleteResult {
	pub meta_removed: u64,
	pub blob_removed: u64,
	pub blob_failed: u64,
}
