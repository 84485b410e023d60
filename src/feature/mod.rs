//! Feature-tree structure and the graph-to-tree builder.
//!
//! The tree is built once per run from a normalized [`ModelGraph`],
//! immutable thereafter, and consumed only by the UVL serializer.
//!
//! [`ModelGraph`]: crate::model::ModelGraph

mod builder;
mod tree;

pub use builder::build_tree;
pub use tree::{Cardinality, Constraint, ConstraintKind, FeatureNode, FeatureTree, GroupKind};
