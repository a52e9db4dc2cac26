//! The engine's error taxonomy (spec.md §7).
//!
//! Styled after `sd-core-file-path-helper::FilePathError`: every variant
//! carries the offending identifier(s), and a single catch-all wraps
//! whatever the underlying store returns.

use uuid::Uuid;

pub type NodeId = i64;
pub type UserId = Uuid;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
	// --- Permission ---
	#[error("user '{user}' has no permission on node '{node}'")]
	NoPermission { user: UserId, node: NodeId },
	#[error("user '{user}' has no permission on source node '{node}'")]
	NoPermissionOnSource { user: UserId, node: NodeId },
	#[error("user '{user}' has no permission on target node '{node}'")]
	NoPermissionOnTarget { user: UserId, node: NodeId },
	#[error("user '{user}' has no permission on a descendant of node '{node}'")]
	NoPermissionOnDescendants { user: UserId, node: NodeId },

	// --- Not found ---
	#[error("object not found: <id='{0}'>")]
	ObjectNotFound(NodeId),
	#[error("parent not found: <id='{0}'>")]
	ParentNotFound(NodeId),
	#[error("user not found: <id='{0}'>")]
	UserNotFound(UserId),
	#[error("root not found: <id='{0}'>")]
	RootNotFound(NodeId),

	// --- Validation ---
	#[error("cannot copy a root node: <id='{0}'>")]
	CannotCopyRoot(NodeId),
	#[error("cannot move a root node: <id='{0}'>")]
	CannotMoveRoot(NodeId),
	#[error("cannot rename a root node: <id='{0}'>")]
	CannotRenameRoot(NodeId),
	#[error("source '{source}' and target '{target}' belong to different roots")]
	CrossRoot { source: NodeId, target: NodeId },
	#[error("node '{0}' is not of the expected type")]
	InvalidObjectType(NodeId),
	#[error("a child named '{conflicting_name}' already exists under '{parent}'")]
	NameAlreadyExists {
		parent: NodeId,
		conflicting_name: String,
	},
	#[error("source and target folder are the same: '{0}'")]
	SameFolder(NodeId),
	#[error("cannot write into the personal-temporary root")]
	CannotWriteToTemporary,
	#[error("user '{user}' already has a '{kind}' root")]
	RootAlreadyExists { user: UserId, kind: &'static str },

	// --- Quota ---
	#[error("root '{root}' would exceed its storage quota of {max_bytes} bytes")]
	StorageExceeded { root: NodeId, max_bytes: u64 },
	#[error("file of {size} bytes exceeds the maximum of {max_bytes} bytes")]
	FileTooLarge { size: u64, max_bytes: u64 },

	// --- Blob ---
	#[error("upload failed for key '{key}': {cause}")]
	UploadFailed { key: String, cause: String },
	#[error("download failed for key '{key}': {cause}")]
	DownloadFailed { key: String, cause: String },
	#[error("delete failed for key '{key}': {cause}")]
	DeleteFailed { key: String, cause: String },
	#[error("copy failed from '{from}' to '{to}': {cause}")]
	CopyFailed {
		from: String,
		to: String,
		cause: String,
	},
	#[error("blob not found: <key='{0}'>")]
	BlobNotFound(String),

	// --- Catch-all ---
	#[error("unexpected error: {0}")]
	Unexpected(String),
}

impl From<sea_orm::DbErr> for EngineError {
	fn from(err: sea_orm::DbErr) -> Self {
		Self::Unexpected(err.to_string())
	}
}

impl EngineError {
	/// True for the error kinds the coordinator reports as non-fatal
	/// blob outcomes rather than aborting an operation (spec.md §7).
	pub fn is_blob_error(&self) -> bool {
		matches!(
			self,
			Self::UploadFailed { .. }
				| Self::DownloadFailed { .. }
				| Self::DeleteFailed { .. }
				| Self::CopyFailed { .. }
				| Self::BlobNotFound(_)
		)
	}
}
