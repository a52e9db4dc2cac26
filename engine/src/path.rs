//! Path algebra (spec.md §4.1).
//!
//! A path is an ordered sequence of node ids from root to the node it
//! names. Node ids are assigned by the store at insertion time, so a
//! node's final path is only known once its row exists — creation is
//! always a two-step write (placeholder insert, then path update)
//! performed inside a single transaction; see [`crate::store::MetadataStore`].

use std::fmt;

use crate::error::NodeId;

/// An ordered sequence of node ids, root-first, canonically written
/// `id0.id1…idn`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<NodeId>);

impl NodePath {
	pub fn new(segments: Vec<NodeId>) -> Self {
		Self(segments)
	}

	pub fn root(id: NodeId) -> Self {
		Self(vec![id])
	}

	pub fn segments(&self) -> &[NodeId] {
		&self.0
	}

	/// Number of segments in the path.
	pub fn level(&self) -> usize {
		self.0.len()
	}

	/// The node id this path terminates at (`path.last == id`, invariant i).
	pub fn last(&self) -> NodeId {
		*self.0.last().expect("a NodePath always has at least one segment")
	}

	/// The root id of this path (first segment).
	pub fn root_id(&self) -> NodeId {
		self.0[0]
	}

	/// `true` if `other` is a prefix of `self`, including equality.
	pub fn is_descendant_of(&self, other: &NodePath) -> bool {
		other.0.len() <= self.0.len() && self.0[..other.0.len()] == other.0[..]
	}

	/// Symmetric of [`Self::is_descendant_of`].
	pub fn is_ancestor_of(&self, other: &NodePath) -> bool {
		other.is_descendant_of(self)
	}

	/// Segment slice `[offset, offset+len)`; `len = None` means "to the end".
	pub fn subpath(&self, offset: usize, len: Option<usize>) -> NodePath {
		let end = match len {
			Some(len) => (offset + len).min(self.0.len()),
			None => self.0.len(),
		};
		NodePath(self.0[offset.min(self.0.len())..end].to_vec())
	}

	/// Append `other`'s segments after this path's.
	pub fn concat(&self, other: &NodePath) -> NodePath {
		let mut segments = self.0.clone();
		segments.extend_from_slice(&other.0);
		NodePath(segments)
	}

	/// `concat(parent, [id])`.
	pub fn child_path(&self, id: NodeId) -> NodePath {
		let mut segments = self.0.clone();
		segments.push(id);
		NodePath(segments)
	}

	/// Canonical `id0.id1…idn` encoding, as stored in Postgres.
	pub fn encode(&self) -> String {
		self.0
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join(".")
	}

	/// Parse the canonical encoding back into segments.
	pub fn decode(s: &str) -> Option<NodePath> {
		if s.is_empty() {
			return None;
		}
		s.split('.')
			.map(|seg| seg.parse::<NodeId>().ok())
			.collect::<Option<Vec<_>>>()
			.map(NodePath)
	}

	/// The prefix used to match direct children of this path in a
	/// `LIKE`/array-prefix query: this path plus exactly one more segment.
	pub fn is_direct_parent_of(&self, child: &NodePath) -> bool {
		child.0.len() == self.0.len() + 1 && child.is_descendant_of(self)
	}
}

impl fmt::Display for NodePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.encode())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn p(segments: &[NodeId]) -> NodePath {
		NodePath::new(segments.to_vec())
	}

	#[test]
	fn descendant_includes_equality() {
		assert!(p(&[1, 2, 3]).is_descendant_of(&p(&[1, 2, 3])));
		assert!(p(&[1, 2, 3]).is_descendant_of(&p(&[1, 2])));
		assert!(!p(&[1, 2]).is_descendant_of(&p(&[1, 2, 3])));
		assert!(!p(&[1, 5]).is_descendant_of(&p(&[1, 2])));
	}

	#[test]
	fn ancestor_is_symmetric_of_descendant() {
		assert!(p(&[1, 2]).is_ancestor_of(&p(&[1, 2, 3])));
		assert!(!p(&[1, 2, 3]).is_ancestor_of(&p(&[1, 2])));
	}

	#[test]
	fn level_counts_segments() {
		assert_eq!(p(&[1]).level(), 1);
		assert_eq!(p(&[1, 2, 3]).level(), 3);
	}

	#[test]
	fn subpath_slices() {
		let path = p(&[1, 2, 3, 4]);
		assert_eq!(path.subpath(1, None), p(&[2, 3, 4]));
		assert_eq!(path.subpath(1, Some(2)), p(&[2, 3]));
		assert_eq!(path.subpath(0, Some(1)), p(&[1]));
	}

	#[test]
	fn concat_and_child_path() {
		let parent = p(&[1, 2]);
		assert_eq!(parent.child_path(3), p(&[1, 2, 3]));
		assert_eq!(parent.concat(&p(&[3, 4])), p(&[1, 2, 3, 4]));
	}

	#[test]
	fn move_preserves_descendant_suffix() {
		// spec.md §8 property 4: moving X=[1,2] under new parent P=[5]
		// preserves the suffix of a descendant D=[1,2,9] past len(old X).
		let old_x = p(&[1, 2]);
		let new_x = p(&[5, 2]);
		let d = p(&[1, 2, 9]);
		let suffix = d.subpath(old_x.level(), None);
		let new_d = new_x.concat(&suffix);
		assert_eq!(new_d, p(&[5, 2, 9]));
	}

	#[test]
	fn encode_decode_round_trip() {
		let path = p(&[10, 20, 30]);
		assert_eq!(path.encode(), "10.20.30");
		assert_eq!(NodePath::decode("10.20.30"), Some(path));
		assert_eq!(NodePath::decode(""), None);
	}

	#[test]
	fn direct_parent_detection() {
		assert!(p(&[1, 2]).is_direct_parent_of(&p(&[1, 2, 3])));
		assert!(!p(&[1, 2]).is_direct_parent_of(&p(&[1, 2, 3, 4])));
		assert!(!p(&[1, 2]).is_direct_parent_of(&p(&[1, 9])));
	}
}
