//! Object-store coordinator: the object-storage half of every combined
//! operation in spec.md §4.4.
//!
//! Bodies are keyed by path, not by a synthetic blob id (spec.md
//! invariant v): a folder's encoded path becomes a key prefix, a file's
//! becomes an object key, with `.` replaced by `/` so the S3 keyspace
//! reads like a filesystem. Bulk work (a multi-file copy, a subtree
//! delete) fans out over `FuturesUnordered` behind a
//! `tokio::sync::Semaphore`, the same bounded-concurrency shape
//! `core/crates/file-actions`'s copier/deleter jobs build on top of
//! (there with a task-system dispatcher; here directly, since no
//! resumable job abstraction is carried over — see `SPEC_FULL.md` §5).

use std::sync::Arc;

use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{error, warn};

use crate::error::EngineError;
use crate::path::NodePath;

/// The outcome of one blob-level sub-task within a bulk operation.
/// Non-fatal blob failures are accumulated here rather than aborting
/// the whole operation (spec.md §4.4).
#[derive(Debug, Clone)]
pub struct BlobOutcome {
	pub key: String,
	pub result: std::result::Result<(), EngineError>,
}

impl BlobOutcome {
	pub fn is_ok(&self) -> bool {
		self.result.is_ok()
	}
}

pub struct ObjectStoreCoordinator {
	client: S3Client,
	bucket: String,
	semaphore: Arc<Semaphore>,
}

impl ObjectStoreCoordinator {
	pub fn new(client: S3Client, bucket: String, concurrency: usize) -> Self {
		Self {
			client,
			bucket,
			semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
		}
	}

	/// Maps a node's materialised path to its object-store key. Folders
	/// get a trailing `/` so prefix listing/deletion matches exactly the
	/// keys that belong to that subtree and nothing adjacent that merely
	/// shares a numeric prefix (e.g. node `12` vs `120`).
	pub fn key_for(path: &NodePath, is_folder: bool) -> String {
		let joined = path
			.segments()
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join("/");
		if is_folder {
			format!("{joined}/")
		} else {
			joined
		}
	}

	/// Uploads a single file body. Used by `upload-with-body`, where the
	/// caller rolls back the metadata transaction on failure (spec.md
	/// §4.4 — the one combined operation where a blob failure IS fatal).
	pub async fn upload(&self, key: &str, body: ByteStream) -> crate::Result<()> {
		let _permit = self.semaphore.acquire().await.expect("semaphore never closes");
		self.client
			.put_object()
			.bucket(&self.bucket)
			.key(key)
			.body(body)
			.send()
			.await
			.map_err(|err| EngineError::UploadFailed {
				key: key.to_string(),
				cause: err.to_string(),
			})?;
		Ok(())
	}

	/// Downloads a single file body for `get-file`.
	pub async fn download(&self, key: &str) -> crate::Result<ByteStream> {
		let _permit = self.semaphore.acquire().await.expect("semaphore never closes");
		let output = self
			.client
			.get_object()
			.bucket(&self.bucket)
			.key(key)
			.send()
			.await
			.map_err(|err| {
				if matches!(err.as_service_error(), Some(GetObjectError::NoSuchKey(_))) {
					EngineError::BlobNotFound(key.to_string())
				} else {
					EngineError::DownloadFailed {
						key: key.to_string(),
						cause: err.to_string(),
					}
				}
			})?;
		Ok(output.body)
	}

	/// Deletes every object whose key is `prefix` or starts with
	/// `prefix` (a folder) — `delete-with-blobs`' bulk removal. Failures
	/// are collected, not propagated: metadata deletion has already
	/// committed by the time this runs (spec.md §4.4).
	pub async fn delete_prefix(&self, prefix: &str) -> Vec<BlobOutcome> {
		let keys = match self.list_keys(prefix).await {
			Ok(keys) => keys,
			Err(err) => {
				error!(prefix, %err, "failed to list keys for prefix delete");
				return vec![BlobOutcome {
					key: prefix.to_string(),
					result: Err(err),
				}];
			}
		};
		self.delete_many(keys).await
	}

	/// Copies every object whose key is `from_prefix` or starts with it
	/// (a folder subtree) to the equivalent key under `to_prefix` —
	/// `copy-with-blobs`' bulk counterpart to [`Self::delete_prefix`], for
	/// the case where a whole folder is copied rather than listed file by
	/// file (spec.md §4.4).
	pub async fn copy_prefix(&self, from_prefix: &str, to_prefix: &str) -> Vec<BlobOutcome> {
		let keys = match self.list_keys(from_prefix).await {
			Ok(keys) => keys,
			Err(err) => {
				error!(from_prefix, %err, "failed to list keys for prefix copy");
				return vec![BlobOutcome {
					key: to_prefix.to_string(),
					result: Err(err),
				}];
			}
		};
		let pairs = keys
			.into_iter()
			.map(|from_key| {
				let suffix = from_key.strip_prefix(from_prefix).unwrap_or(&from_key).to_string();
				let to_key = format!("{to_prefix}{suffix}");
				(from_key, to_key)
			})
			.collect();
		self.copy_many(pairs).await
	}

	/// Deletes a single known key (a leaf file, not a prefix).
	pub async fn delete_one(&self, key: &str) -> BlobOutcome {
		let result = self.delete_one_inner(key).await;
		BlobOutcome {
			key: key.to_string(),
			result,
		}
	}

	async fn delete_one_inner(&self, key: &str) -> crate::Result<()> {
		let _permit = self.semaphore.acquire().await.expect("semaphore never closes");
		self.client
			.delete_object()
			.bucket(&self.bucket)
			.key(key)
			.send()
			.await
			.map_err(|err| EngineError::DeleteFailed {
				key: key.to_string(),
				cause: err.to_string(),
			})?;
		Ok(())
	}

	async fn delete_many(&self, keys: Vec<String>) -> Vec<BlobOutcome> {
		let mut tasks = FuturesUnordered::new();
		for key in keys {
			tasks.push(async move { self.delete_one(&key).await });
		}
		let mut outcomes = Vec::new();
		while let Some(outcome) = tasks.next().await {
			if let Err(ref err) = outcome.result {
				warn!(key = %outcome.key, %err, "blob delete failed");
			}
			outcomes.push(outcome);
		}
		outcomes
	}

	/// Server-side copies a single object. Used by `copy-with-blobs` for
	/// each file in a [`crate::store::ReplicationMapping`].
	pub async fn copy_one(&self, from_key: &str, to_key: &str) -> BlobOutcome {
		let result = self.copy_one_inner(from_key, to_key).await;
		BlobOutcome {
			key: to_key.to_string(),
			result,
		}
	}

	async fn copy_one_inner(&self, from_key: &str, to_key: &str) -> crate::Result<()> {
		let _permit = self.semaphore.acquire().await.expect("semaphore never closes");
		let source = format!("{}/{}", self.bucket, from_key);
		self.client
			.copy_object()
			.bucket(&self.bucket)
			.copy_source(&source)
			.key(to_key)
			.send()
			.await
			.map_err(|err| EngineError::CopyFailed {
				from: from_key.to_string(),
				to: to_key.to_string(),
				cause: err.to_string(),
			})?;
		Ok(())
	}

	/// Fans out a batch of `(from_key, to_key)` pairs bounded by this
	/// coordinator's semaphore, for `copy-with-blobs`'s multi-file case.
	pub async fn copy_many(&self, pairs: Vec<(String, String)>) -> Vec<BlobOutcome> {
		let mut tasks = FuturesUnordered::new();
		for (from_key, to_key) in pairs {
			tasks.push(async move { self.copy_one(&from_key, &to_key).await });
		}
		let mut outcomes = Vec::new();
		while let Some(outcome) = tasks.next().await {
			outcomes.push(outcome);
		}
		outcomes
	}

	/// Replicates blob bodies for `move-with-blobs`: same-bucket
	/// server-side copy to the new key followed by deletion of the old
	/// one. Failures on either half are reported as a single outcome
	/// keyed by the destination.
	pub async fn move_many(&self, pairs: Vec<(String, String)>) -> Vec<BlobOutcome> {
		let mut tasks = FuturesUnordered::new();
		for (from_key, to_key) in pairs {
			tasks.push(async move {
				let copy = self.copy_one_inner(&from_key, &to_key).await;
				if copy.is_ok() {
					if let Err(err) = self.delete_one_inner(&from_key).await {
						warn!(from_key, %err, "orphaned source blob after move copy succeeded");
					}
				}
				BlobOutcome { key: to_key, result: copy }
			});
		}
		let mut outcomes = Vec::new();
		while let Some(outcome) = tasks.next().await {
			outcomes.push(outcome);
		}
		outcomes
	}

	async fn list_keys(&self, prefix: &str) -> crate::Result<Vec<String>> {
		let _permit = self.semaphore.acquire().await.expect("semaphore never closes");
		let mut keys = Vec::new();
		let mut continuation: Option<String> = None;
		loop {
			let mut req = self.client.list_objects_v2().bucket(&self.bucket).prefix(prefix);
			if let Some(token) = continuation.take() {
				req = req.continuation_token(token);
			}
			let output = req.send().await.map_err(|err| EngineError::DeleteFailed {
				key: prefix.to_string(),
				cause: err.to_string(),
			})?;
			keys.extend(output.contents().iter().filter_map(|obj| obj.key().map(str::to_string)));

			if output.is_truncated().unwrap_or(false) {
				continuation = output.next_continuation_token().map(str::to_string);
			} else {
				break;
			}
		}
		Ok(keys)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn file_keys_join_segments_with_slash() {
		let path = NodePath::new(vec![7, 12, 9]);
		assert_eq!(ObjectStoreCoordinator::key_for(&path, false), "7/12/9");
	}

	#[test]
	fn folder_keys_get_a_trailing_slash() {
		let path = NodePath::new(vec![7, 12]);
		assert_eq!(ObjectStoreCoordinator::key_for(&path, true), "7/12/");
	}

	#[test]
	fn sibling_ids_do_not_collide_on_shared_numeric_prefix() {
		let twelve = NodePath::new(vec![12]);
		let one_twenty = NodePath::new(vec![120]);
		assert_ne!(
			ObjectStoreCoordinator::key_for(&twelve, true),
			ObjectStoreCoordinator::key_for(&one_twenty, true)
		);
	}
}
