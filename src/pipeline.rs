//! One-shot transformation pipeline.
//!
//! Wires the stages together: diagram XML bytes → raw graph → normalized
//! graph → feature tree → UVL text. Single-threaded, no shared mutable
//! state; the mapping set is read-only and may be reused across runs.

use crate::error::TransformError;
use crate::mapping::MappingSet;

/// Transform diagram XML bytes into UVL text.
///
/// Deterministic: byte-identical input and mappings produce byte-identical
/// output. On failure nothing has been written anywhere; writing the
/// result is the caller's responsibility.
pub fn transform(input: &[u8], mappings: &MappingSet) -> Result<String, TransformError> {
    let graph = crate::diagram::read_diagram(input)?;
    tracing::debug!(
        elements = graph.elements.len(),
        relationships = graph.relationships.len(),
        "diagram parsed"
    );
    let graph = crate::normalize::normalize_graph(graph);
    let tree = crate::feature::build_tree(&graph, mappings)?;
    crate::uvl::write_uvl(&tree)
}
