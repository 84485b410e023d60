//! Typed graph of intentional elements and relationships.
//!
//! The model stores elements by ID, with relationships as separate edges.
//! This mirrors the structure of the diagram export and enables the
//! normalizer to merge duplicated elements with an explicit id-rewrite
//! pass instead of in-place graph surgery.
//!
//! ```text
//! ModelGraph
//! ├── elements: IndexMap<ElementId, IntentionalElement>  (preserves insertion order)
//! └── relationships: Vec<Relationship>
//! ```

use indexmap::IndexMap;
use std::sync::Arc;

// ============================================================================
// IDs
// ============================================================================

/// Unique identifier for a model element.
///
/// This corresponds to the `id` attribute of a diagram cell. The diagram
/// editor guarantees uniqueness within one export.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(pub Arc<str>);

impl ElementId {
    /// Create a new element ID.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

// ============================================================================
// ELEMENT AND RELATIONSHIP KINDS
// ============================================================================

/// The intentional-element type of a diagram shape.
///
/// `Unknown` covers shapes whose style could not be matched to the
/// notation's visual convention; such elements are retained and every
/// downstream stage tolerates them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Actor,
    Goal,
    Task,
    Resource,
    Softgoal,
    Unknown,
}

impl ElementKind {
    /// Actors and goals can anchor the feature hierarchy.
    pub fn is_root_candidate(&self) -> bool {
        matches!(self, Self::Actor | Self::Goal)
    }

    /// Fallback feature name for elements with empty labels.
    pub fn fallback_name(&self) -> &'static str {
        match self {
            Self::Actor => "Actor",
            Self::Goal => "Goal",
            Self::Task => "Task",
            Self::Resource => "Resource",
            Self::Softgoal => "Softgoal",
            Self::Unknown => "Element",
        }
    }
}

/// The relationship type of a diagram edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    Decomposition,
    MeansEnd,
    Contribution,
    Dependency,
}

impl RelationshipKind {
    /// Decomposition and means-end edges define the feature hierarchy.
    pub fn is_hierarchy(&self) -> bool {
        matches!(self, Self::Decomposition | Self::MeansEnd)
    }
}

/// Strength/polarity of a contribution edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContributionPolarity {
    Make,
    Help,
    Hurt,
    Break,
    Unknown,
}

impl ContributionPolarity {
    /// Hurt/Break contributions never create hierarchy edges; they are
    /// recorded as candidate excludes constraints instead.
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::Hurt | Self::Break)
    }
}

// ============================================================================
// ELEMENTS AND RELATIONSHIPS
// ============================================================================

/// One node of the i* model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntentionalElement {
    /// Stable id from the diagram.
    pub id: ElementId,
    /// Classified element kind.
    pub kind: ElementKind,
    /// Label exactly as exported by the editor (may contain markup).
    pub raw_label: String,
    /// Cleaned presentation label: markup stripped, casing preserved.
    pub label: String,
    /// Normalized lookup form: lower-case, diacritic-free, single-spaced.
    /// Empty until the normalizer has run.
    pub norm: String,
}

impl IntentionalElement {
    /// Create an element from a raw diagram label. The presentation label
    /// is cleaned immediately; the lookup form is filled by the normalizer.
    pub fn new(id: impl Into<ElementId>, kind: ElementKind, raw_label: impl Into<String>) -> Self {
        let raw_label = raw_label.into();
        let label = crate::text::clean_label(&raw_label);
        Self {
            id: id.into(),
            kind,
            raw_label,
            label,
            norm: String::new(),
        }
    }
}

/// A directed edge between two intentional elements.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub source: ElementId,
    pub target: ElementId,
    /// Present only for contribution edges.
    pub polarity: Option<ContributionPolarity>,
}

impl Relationship {
    pub fn new(
        kind: RelationshipKind,
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
            target: target.into(),
            polarity: None,
        }
    }

    pub fn with_polarity(mut self, polarity: ContributionPolarity) -> Self {
        self.polarity = Some(polarity);
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

// ============================================================================
// MODEL GRAPH
// ============================================================================

/// Set of intentional elements plus the relationships between them.
///
/// Invariant: every relationship endpoint references an existing element.
/// The diagram reader enforces this at assembly time and the normalizer
/// preserves it across merges. Isolated elements are retained.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelGraph {
    /// All elements by ID, in document order.
    pub elements: IndexMap<ElementId, IntentionalElement>,
    /// All relationships, in document order.
    pub relationships: Vec<Relationship>,
}

impl ModelGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element to the graph. A re-used ID replaces the earlier
    /// element (diagram editors do not produce duplicate cell ids).
    pub fn add_element(&mut self, element: IntentionalElement) {
        self.elements.insert(element.id.clone(), element);
    }

    /// Add a relationship. Both endpoints must already be present.
    pub fn add_relationship(&mut self, relationship: Relationship) {
        debug_assert!(self.contains(&relationship.source));
        debug_assert!(self.contains(&relationship.target));
        self.relationships.push(relationship);
    }

    /// Get an element by ID.
    pub fn get(&self, id: &ElementId) -> Option<&IntentionalElement> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Iterate over elements in document order.
    pub fn iter_elements(&self) -> impl Iterator<Item = &IntentionalElement> {
        self.elements.values()
    }

    /// Count the outgoing hierarchy edges (decomposition/means-end) of an
    /// element. Used for root selection.
    pub fn outgoing_hierarchy_count(&self, id: &ElementId) -> usize {
        self.relationships
            .iter()
            .filter(|r| r.kind.is_hierarchy() && &r.source == id)
            .count()
    }

    /// First element of the given kind, in document order.
    pub fn first_of_kind(&self, kind: ElementKind) -> Option<&IntentionalElement> {
        self.iter_elements().find(|e| e.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
