//! Feature-tree data types.

/// Whether a feature must be selected when its parent is.
///
/// Only meaningful inside and-groups; children of or/alternative groups
/// take their semantics from the group itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    Mandatory,
    Optional,
}

/// How a feature's children relate to each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKind {
    /// Children are selected independently, per their cardinality.
    And,
    /// At least one child must be selected.
    Or,
    /// Exactly one child must be selected.
    Alternative,
}

/// One node of the output feature tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureNode {
    /// UVL-legal identifier, unique within the tree.
    pub name: String,
    pub cardinality: Cardinality,
    /// Group kind governing this node's children.
    pub group: GroupKind,
    /// Children in deterministic traversal order.
    pub children: Vec<FeatureNode>,
}

impl FeatureNode {
    /// Create a mandatory leaf with an and-group for future children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::Mandatory,
            group: GroupKind::And,
            children: Vec::new(),
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Pre-order walk over this node and all descendants.
    pub fn walk(&self, visit: &mut impl FnMut(&FeatureNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// The kind of a cross-tree constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Requires,
    Excludes,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Requires => write!(f, "requires"),
            Self::Excludes => write!(f, "excludes"),
        }
    }
}

/// A cross-tree constraint between two features.
///
/// Invariant: both names exist in the tree at serialization time. The
/// builder guarantees this; the serializer re-checks defensively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub source: String,
    pub target: String,
}

impl Constraint {
    pub fn requires(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: ConstraintKind::Requires,
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn excludes(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: ConstraintKind::Excludes,
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Root feature plus the ordered cross-tree constraints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureTree {
    pub root: FeatureNode,
    pub constraints: Vec<Constraint>,
}

impl FeatureTree {
    /// All feature names in pre-order.
    pub fn feature_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_names(&self.root, &mut names);
        names
    }

    pub fn contains_feature(&self, name: &str) -> bool {
        self.feature_names().contains(&name)
    }
}

fn collect_names<'a>(node: &'a FeatureNode, names: &mut Vec<&'a str>) {
    names.push(node.name.as_str());
    for child in &node.children {
        collect_names(child, names);
    }
}
