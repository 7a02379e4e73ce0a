//! Addressable manifest tree for groundcheck
//!
//! Parses Kubernetes-style block YAML into a tree whose nodes remember their
//! byte layout in the submitted text. Rendering an untouched tree reproduces
//! the input byte for byte, which is what makes a report's "before" snippet a
//! verifiable substring of the manifest. Sequence elements that carry a
//! `name` field are addressed by that name, never by numeric index.
//!
//! The parser covers the block-style subset Kubernetes manifests are written
//! in: nested mappings, sequences of scalars and mappings, quoted scalars,
//! block scalars, comments, and single-line flow collections. Anchors,
//! multi-document streams, and multi-line flow collections are rejected with
//! a parse error.

pub mod diff;
pub mod parse;
pub mod path;
pub mod tree;

pub use diff::{DiffEntry, DiffOp, structural_diff};
pub use parse::parse;
pub use path::{ManifestPath, PathSegment};
pub use tree::{ManifestTree, MapEntry, Node, NodeContent, Scalar, SeqItem};
