//! Label normalization and duplicate-element merging.
//!
//! Graphical exports routinely draw the same actor or goal several times;
//! the same concept then arrives as distinct elements whose labels differ
//! only in case, accents, or stray whitespace. This pass fills in every
//! element's normalized lookup label and merges elements that normalize to
//! the same non-empty label, keeping the first-seen id as canonical.
//! Merging is an explicit id-rewrite over the relationship list, never
//! in-place graph surgery, so endpoints cannot dangle.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::model::{ElementId, ElementKind, IntentionalElement, ModelGraph, Relationship};
use crate::text::normalize_label;

/// Normalize all labels and merge duplicated elements.
///
/// Invariants preserved:
/// - every relationship endpoint still references an existing element;
/// - an edge that the rewrite would turn into a self-loop is dropped
///   rather than kept as a cycle of length one;
/// - exact duplicate relationships are collapsed to one.
///
/// The pass is idempotent.
pub fn normalize_graph(graph: ModelGraph) -> ModelGraph {
    let mut canonical_by_norm: FxHashMap<String, ElementId> = FxHashMap::default();
    let mut rewrite: FxHashMap<ElementId, ElementId> = FxHashMap::default();
    let mut elements: IndexMap<ElementId, IntentionalElement> = IndexMap::new();

    for (id, mut element) in graph.elements {
        element.norm = normalize_label(&element.label);
        if element.norm.is_empty() {
            // Nothing to merge on; keep the element as-is.
            elements.insert(id, element);
            continue;
        }
        match canonical_by_norm.get(&element.norm) {
            None => {
                canonical_by_norm.insert(element.norm.clone(), id.clone());
                elements.insert(id, element);
            }
            Some(canonical) => {
                tracing::debug!(
                    duplicate = %id,
                    canonical = %canonical,
                    label = %element.norm,
                    "merging duplicated element"
                );
                if let Some(kept) = elements.get_mut(canonical) {
                    // A duplicate with a recognized shape can settle the
                    // kind of an unclassifiable canonical copy.
                    if kept.kind == ElementKind::Unknown && element.kind != ElementKind::Unknown {
                        kept.kind = element.kind;
                    }
                }
                rewrite.insert(id, canonical.clone());
            }
        }
    }

    let mut seen: FxHashSet<Relationship> = FxHashSet::default();
    let mut relationships = Vec::with_capacity(graph.relationships.len());
    for mut rel in graph.relationships {
        let was_self_loop = rel.is_self_loop();
        if let Some(canonical) = rewrite.get(&rel.source) {
            rel.source = canonical.clone();
        }
        if let Some(canonical) = rewrite.get(&rel.target) {
            rel.target = canonical.clone();
        }
        if rel.is_self_loop() && !was_self_loop {
            tracing::debug!(endpoint = %rel.source, "merge collapsed edge into a self-loop, dropped");
            continue;
        }
        if seen.insert(rel.clone()) {
            relationships.push(rel);
        }
    }

    ModelGraph {
        elements,
        relationships,
    }
}
