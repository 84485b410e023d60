//! Error types for the transformation pipeline.

use thiserror::Error;

/// Errors that can occur while transforming a diagram into a feature model.
///
/// Configuration problems (unusable mapping lines, missing mapping files)
/// are deliberately not part of this taxonomy: they are non-fatal and are
/// reported through `tracing::warn!` by the mapping loader.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The input is not a well-formed diagram document, or lacks the
    /// expected shape/edge containers.
    #[error("malformed diagram: {0}")]
    MalformedDiagram(String),

    /// The model graph has no viable root (no actor or goal to hang the
    /// feature hierarchy from).
    #[error("unresolved hierarchy: {0}")]
    UnresolvedHierarchy(String),

    /// A constraint references a feature name that is absent from the
    /// tree. The builder guarantees referential integrity, so this is a
    /// defensive check only.
    #[error("unserializable tree: {0}")]
    UnserializableTree(String),
}

impl TransformError {
    /// Create a malformed-diagram error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDiagram(message.into())
    }

    /// Create an unresolved-hierarchy error.
    pub fn unresolved(message: impl Into<String>) -> Self {
        Self::UnresolvedHierarchy(message.into())
    }

    /// Create an unserializable-tree error.
    pub fn unserializable(message: impl Into<String>) -> Self {
        Self::UnserializableTree(message.into())
    }
}
