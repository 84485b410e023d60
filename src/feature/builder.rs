//! Graph-to-tree builder.
//!
//! Walks the normalized model graph and derives the feature tree plus its
//! cross-tree constraints, consulting the four mapping tables:
//!
//! 1. root selection (actor boundary, or the busiest hierarchy head);
//! 2. hierarchy derivation from decomposition/means-end edges;
//! 3. optionality from positive contribution edges;
//! 4. classification-driven name suffixes and group coercion;
//! 5. constraints from dependencies and negative contributions;
//! 6. deterministic name uniqueness.
//!
//! Cycle and diamond edges in the source graph are dropped during the
//! walk (a feature has exactly one parent), so the walk always terminates.

use rustc_hash::{FxHashMap, FxHashSet};

use indexmap::IndexMap;

use super::tree::{Cardinality, Constraint, ConstraintKind, FeatureNode, FeatureTree, GroupKind};
use crate::error::TransformError;
use crate::mapping::{MappingSet, MappingTable};
use crate::model::{
    ContributionPolarity, ElementId, ElementKind, IntentionalElement, ModelGraph, RelationshipKind,
};
use crate::text::to_identifier;

/// Build a feature tree from a normalized model graph.
///
/// Fails with [`TransformError::UnresolvedHierarchy`] when the graph has
/// no actor or goal element to anchor the tree.
pub fn build_tree(graph: &ModelGraph, mappings: &MappingSet) -> Result<FeatureTree, TransformError> {
    TreeBuilder::new(graph, mappings).build()
}

/// Default category features carried over from the reference vocabulary:
/// a model with no detected backend still runs on hardware, and one with
/// no detected integration mechanism still talks through middleware.
const DEFAULT_BACKEND: &str = "Hardware";
const DEFAULT_INTEGRATION: &str = "Middleware";

#[derive(Clone)]
struct HierarchyLink {
    child: ElementId,
    kind: RelationshipKind,
}

#[derive(Clone)]
struct ContributionLink {
    child: ElementId,
    polarity: ContributionPolarity,
}

/// Per-child bookkeeping needed for group coercion after a node's
/// children are built. Synthetic children (default categories) have no
/// element id.
struct ChildMeta {
    id: Option<ElementId>,
    kind: ElementKind,
    link: Option<RelationshipKind>,
    name: String,
}

enum CategoryTable {
    Backend,
    Integration,
}

struct TreeBuilder<'a> {
    graph: &'a ModelGraph,
    mappings: &'a MappingSet,

    /// parent → hierarchy children, in document order.
    hierarchy: FxHashMap<ElementId, Vec<HierarchyLink>>,
    /// contributed-to element → positively contributing children.
    contributions: FxHashMap<ElementId, Vec<ContributionLink>>,
    /// Elements that are the target of some hierarchy edge.
    hierarchy_children: FxHashSet<ElementId>,

    /// Elements already placed in the tree.
    placed: FxHashSet<ElementId>,
    /// Assigned feature name per element.
    names: FxHashMap<ElementId, String>,
    used_names: FxHashSet<String>,

    constraints: Vec<Constraint>,
    constraint_keys: FxHashSet<(ConstraintKind, String, String)>,

    /// Names of algorithm-/NFR-classified features, in traversal order.
    algo_features: Vec<String>,
    nfr_features: Vec<String>,
    backend_hit: bool,
    integration_hit: bool,
}

impl<'a> TreeBuilder<'a> {
    fn new(graph: &'a ModelGraph, mappings: &'a MappingSet) -> Self {
        Self {
            graph,
            mappings,
            hierarchy: FxHashMap::default(),
            contributions: FxHashMap::default(),
            hierarchy_children: FxHashSet::default(),
            placed: FxHashSet::default(),
            names: FxHashMap::default(),
            used_names: FxHashSet::default(),
            constraints: Vec::new(),
            constraint_keys: FxHashSet::default(),
            algo_features: Vec::new(),
            nfr_features: Vec::new(),
            backend_hit: false,
            integration_hit: false,
        }
    }

    fn build(mut self) -> Result<FeatureTree, TransformError> {
        self.index_relationships();
        let root_id = self.select_root()?;

        let graph = self.graph;
        let root_element = &graph.elements[&root_id];
        let root_name = self.assign_name(root_element, Some("RootGoal"));
        self.placed.insert(root_id.clone());

        // Root is mandatory by construction. Grouping is deferred until
        // every hierarchy head, orphan, and default has been attached.
        let mut root = FeatureNode::new(root_name);
        let mut root_meta: Vec<ChildMeta> = Vec::new();
        let mut path = vec![root_id.clone()];
        self.expand_links(&root_id, &mut root, &mut root_meta, &mut path);

        self.attach_hierarchy_heads(&mut root, &mut root_meta);
        self.attach_orphans(&mut root, &mut root_meta);
        self.attach_default_categories(&mut root, &mut root_meta);
        self.apply_grouping(&mut root, &root_meta, root_element.kind);

        self.derive_constraints();

        Ok(FeatureTree {
            root,
            constraints: self.constraints,
        })
    }

    /// Index relationships into the parent→children maps used by the walk.
    fn index_relationships(&mut self) {
        for rel in &self.graph.relationships {
            // Self-edges cannot shape a hierarchy.
            if rel.is_self_loop() {
                continue;
            }
            match rel.kind {
                RelationshipKind::Decomposition | RelationshipKind::MeansEnd => {
                    self.hierarchy
                        .entry(rel.source.clone())
                        .or_default()
                        .push(HierarchyLink {
                            child: rel.target.clone(),
                            kind: rel.kind,
                        });
                    self.hierarchy_children.insert(rel.target.clone());
                }
                RelationshipKind::Contribution => {
                    let polarity = rel.polarity.unwrap_or(ContributionPolarity::Unknown);
                    if !polarity.is_negative() {
                        self.contributions
                            .entry(rel.target.clone())
                            .or_default()
                            .push(ContributionLink {
                                child: rel.source.clone(),
                                polarity,
                            });
                    }
                }
                RelationshipKind::Dependency => {}
            }
        }
    }

    /// Pick the element the tree hangs from.
    ///
    /// The first actor (document order) always heads the tree; without an
    /// actor the element with the most outgoing hierarchy edges does, and
    /// a fully flat model falls back to its first goal.
    fn select_root(&self) -> Result<ElementId, TransformError> {
        let graph = self.graph;
        if !graph.iter_elements().any(|e| e.kind.is_root_candidate()) {
            return Err(TransformError::unresolved(
                "model has no actor or goal element to serve as a root",
            ));
        }
        if let Some(actor) = graph.first_of_kind(ElementKind::Actor) {
            return Ok(actor.id.clone());
        }
        let mut best: Option<(&ElementId, usize)> = None;
        for element in graph.iter_elements() {
            let count = graph.outgoing_hierarchy_count(&element.id);
            if count > 0 && best.is_none_or(|(_, c)| count > c) {
                best = Some((&element.id, count));
            }
        }
        if let Some((id, _)) = best {
            return Ok(id.clone());
        }
        if let Some(goal) = graph.first_of_kind(ElementKind::Goal) {
            return Ok(goal.id.clone());
        }
        Err(TransformError::unresolved(
            "model has no goal element to serve as a root",
        ))
    }

    /// Build the node for `id` and everything beneath it.
    fn make_node(
        &mut self,
        id: &ElementId,
        cardinality: Cardinality,
        path: &mut Vec<ElementId>,
    ) -> FeatureNode {
        let kind = self.graph.elements[id].kind;
        let mut meta = Vec::new();
        let graph = self.graph;
        let element = &graph.elements[id];
        let name = self.assign_name(element, None);
        self.placed.insert(id.clone());

        let mut node = FeatureNode::new(name).with_cardinality(cardinality);
        path.push(id.clone());
        self.expand_links(id, &mut node, &mut meta, path);
        path.pop();
        self.apply_grouping(&mut node, &meta, kind);
        node
    }

    /// Expand the hierarchy and contribution children of a node. Grouping
    /// is applied by the caller (deferred for the root, which collects
    /// heads, orphans, and defaults first).
    fn expand_links(
        &mut self,
        id: &ElementId,
        node: &mut FeatureNode,
        meta: &mut Vec<ChildMeta>,
        path: &mut Vec<ElementId>,
    ) {
        let graph = self.graph;

        for link in self.hierarchy.get(id).cloned().unwrap_or_default() {
            if path.contains(&link.child) {
                tracing::debug!(parent = %id, child = %link.child, "hierarchy cycle, edge dropped");
                continue;
            }
            if self.placed.contains(&link.child) {
                tracing::debug!(child = %link.child, "element already placed, extra hierarchy edge dropped");
                continue;
            }
            let child_kind = graph.elements[&link.child].kind;
            let child = self.make_node(&link.child, Cardinality::Mandatory, path);
            meta.push(ChildMeta {
                id: Some(link.child.clone()),
                kind: child_kind,
                link: Some(link.kind),
                name: child.name.clone(),
            });
            node.children.push(child);
        }

        // An element reachable only through a positive contribution hangs
        // beneath the contributed-to feature: mandatory for Make, optional
        // for Help (and for unknown polarity, read charitably).
        for link in self.contributions.get(id).cloned().unwrap_or_default() {
            if self.hierarchy_children.contains(&link.child) {
                continue;
            }
            if path.contains(&link.child) || self.placed.contains(&link.child) {
                continue;
            }
            let cardinality = if link.polarity == ContributionPolarity::Make {
                Cardinality::Mandatory
            } else {
                Cardinality::Optional
            };
            let child_kind = graph.elements[&link.child].kind;
            let child = self.make_node(&link.child, cardinality, path);
            meta.push(ChildMeta {
                id: Some(link.child.clone()),
                kind: child_kind,
                link: None,
                name: child.name.clone(),
            });
            node.children.push(child);
        }
    }

    /// Attach remaining hierarchy heads (elements with children that are
    /// nobody's child) as mandatory children of the root.
    fn attach_hierarchy_heads(&mut self, root: &mut FeatureNode, meta: &mut Vec<ChildMeta>) {
        let graph = self.graph;
        let head_ids: Vec<ElementId> = graph
            .iter_elements()
            .filter(|e| {
                e.kind != ElementKind::Actor
                    && self.hierarchy.contains_key(&e.id)
                    && !self.hierarchy_children.contains(&e.id)
                    && !self.placed.contains(&e.id)
            })
            .map(|e| e.id.clone())
            .collect();
        for id in head_ids {
            let kind = graph.elements[&id].kind;
            let mut path = Vec::new();
            let node = self.make_node(&id, Cardinality::Mandatory, &mut path);
            meta.push(ChildMeta {
                id: Some(id),
                kind,
                link: None,
                name: node.name.clone(),
            });
            root.children.push(node);
        }
    }

    /// Attach every remaining labeled non-actor element as an optional
    /// child of the root. This keeps dependency/contribution endpoints
    /// inside the tree, so constraints never dangle.
    fn attach_orphans(&mut self, root: &mut FeatureNode, meta: &mut Vec<ChildMeta>) {
        let graph = self.graph;
        let orphan_ids: Vec<ElementId> = graph
            .iter_elements()
            .filter(|e| {
                !self.placed.contains(&e.id)
                    && e.kind != ElementKind::Actor
                    && !to_identifier(&e.label).is_empty()
            })
            .map(|e| e.id.clone())
            .collect();
        for id in orphan_ids {
            if self.placed.contains(&id) {
                // Placed transitively by an earlier orphan's subtree.
                continue;
            }
            let kind = graph.elements[&id].kind;
            let mut path = Vec::new();
            let node = self.make_node(&id, Cardinality::Optional, &mut path);
            meta.push(ChildMeta {
                id: Some(id),
                kind,
                link: None,
                name: node.name.clone(),
            });
            root.children.push(node);
        }
    }

    /// Attach the default backend/integration category features when no
    /// element was classified into the respective table.
    fn attach_default_categories(&mut self, root: &mut FeatureNode, meta: &mut Vec<ChildMeta>) {
        let mappings = self.mappings;
        let defaults = [
            (self.backend_hit, &mappings.backend, DEFAULT_BACKEND),
            (
                self.integration_hit,
                &mappings.integration,
                DEFAULT_INTEGRATION,
            ),
        ];
        let mut to_add = Vec::new();
        for (hit, table, default) in defaults {
            if !hit && table.categories().any(|c| c == default) {
                to_add.push(default);
            }
        }
        for default in to_add {
            let name = self.unique_name(default.to_string());
            tracing::debug!(feature = %name, "no category detected, attaching default feature");
            meta.push(ChildMeta {
                id: None,
                kind: ElementKind::Unknown,
                link: None,
                name: name.clone(),
            });
            root.children
                .push(FeatureNode::new(name).with_cardinality(Cardinality::Optional));
        }
    }

    // ── Grouping ────────────────────────────────────────────────────

    /// Decide the node's group kind from its children.
    ///
    /// Mutually exclusive means-end tasks under a goal, and siblings that
    /// resolve to one backend category, become an alternative-group when
    /// they are the node's only children; a strict subset is expressed as
    /// pairwise excludes constraints instead, keeping the and-group
    /// intact. Siblings sharing an integration category become an
    /// or-group under the same covers-all rule.
    fn apply_grouping(&mut self, node: &mut FeatureNode, meta: &[ChildMeta], parent_kind: ElementKind) {
        if node.children.len() < 2 {
            return;
        }

        if parent_kind == ElementKind::Goal {
            let cluster: Vec<usize> = meta
                .iter()
                .enumerate()
                .filter(|(_, m)| {
                    m.link == Some(RelationshipKind::MeansEnd) && m.kind == ElementKind::Task
                })
                .map(|(i, _)| i)
                .collect();
            if cluster.len() >= 2 && !self.has_decomposition_within(meta, &cluster) {
                if cluster.len() == node.children.len() {
                    node.group = GroupKind::Alternative;
                } else {
                    self.pairwise_excludes(meta, &cluster);
                }
            }
        }

        if node.group == GroupKind::And {
            self.coerce_same_category(node, meta, CategoryTable::Backend);
        }
        if node.group == GroupKind::And {
            self.coerce_same_category(node, meta, CategoryTable::Integration);
        }
    }

    fn coerce_same_category(
        &mut self,
        node: &mut FeatureNode,
        meta: &[ChildMeta],
        which: CategoryTable,
    ) {
        let graph = self.graph;
        let mappings = self.mappings;
        let table: &MappingTable = match which {
            CategoryTable::Backend => &mappings.backend,
            CategoryTable::Integration => &mappings.integration,
        };

        let mut by_category: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (i, m) in meta.iter().enumerate() {
            let Some(id) = &m.id else { continue };
            let norm = &graph.elements[id].norm;
            if let Some(category) = table.first_match(norm) {
                by_category.entry(category.to_string()).or_default().push(i);
            }
        }

        for (category, members) in by_category {
            if members.len() < 2 {
                continue;
            }
            if members.len() == node.children.len() {
                node.group = match which {
                    CategoryTable::Backend => GroupKind::Alternative,
                    CategoryTable::Integration => GroupKind::Or,
                };
                tracing::debug!(%category, "siblings share one category, group coerced");
                return;
            }
            if matches!(which, CategoryTable::Backend) {
                // Exclusive backends that are only some of the siblings:
                // exclusivity survives as constraints.
                self.pairwise_excludes(meta, &members);
            }
        }
    }

    fn has_decomposition_within(&self, meta: &[ChildMeta], cluster: &[usize]) -> bool {
        let ids: Vec<&ElementId> = cluster
            .iter()
            .filter_map(|&i| meta[i].id.as_ref())
            .collect();
        self.graph.relationships.iter().any(|r| {
            r.kind == RelationshipKind::Decomposition
                && ids.contains(&&r.source)
                && ids.contains(&&r.target)
        })
    }

    fn pairwise_excludes(&mut self, meta: &[ChildMeta], members: &[usize]) {
        for (pos, &a) in members.iter().enumerate() {
            for &b in &members[pos + 1..] {
                self.push_constraint(
                    ConstraintKind::Excludes,
                    meta[a].name.clone(),
                    meta[b].name.clone(),
                );
            }
        }
    }

    // ── Constraints ─────────────────────────────────────────────────

    /// Derive cross-tree constraints once every feature is named.
    fn derive_constraints(&mut self) {
        let graph = self.graph;
        for rel in &graph.relationships {
            match rel.kind {
                RelationshipKind::Dependency => {
                    let (Some(source), Some(target)) =
                        (self.names.get(&rel.source), self.names.get(&rel.target))
                    else {
                        tracing::debug!(
                            source = %rel.source,
                            target = %rel.target,
                            "dependency endpoint is not a feature, constraint skipped"
                        );
                        continue;
                    };
                    let (source, target) = (source.clone(), target.clone());
                    self.push_constraint(ConstraintKind::Requires, source, target);
                }
                RelationshipKind::Contribution
                    if rel.polarity.is_some_and(|p| p.is_negative()) =>
                {
                    let (Some(source), Some(target)) =
                        (self.names.get(&rel.source), self.names.get(&rel.target))
                    else {
                        tracing::debug!(
                            source = %rel.source,
                            target = %rel.target,
                            "contribution endpoint is not a feature, constraint skipped"
                        );
                        continue;
                    };
                    let (source, target) = (source.clone(), target.clone());
                    self.push_constraint(ConstraintKind::Excludes, source, target);
                }
                _ => {}
            }
        }

        // Algorithms lean on every detected quality requirement.
        let algos = self.algo_features.clone();
        let nfrs = self.nfr_features.clone();
        for algo in &algos {
            for nfr in &nfrs {
                self.push_constraint(ConstraintKind::Requires, algo.clone(), nfr.clone());
            }
        }
    }

    fn push_constraint(&mut self, kind: ConstraintKind, source: String, target: String) {
        if source == target {
            return;
        }
        if self
            .constraint_keys
            .insert((kind, source.clone(), target.clone()))
        {
            self.constraints.push(Constraint { kind, source, target });
        }
    }

    // ── Naming and classification ───────────────────────────────────

    /// Derive the feature name for an element, record its classification,
    /// and make the name unique within the tree.
    fn assign_name(&mut self, element: &IntentionalElement, root_fallback: Option<&str>) -> String {
        let mut base = to_identifier(&element.label);
        if base.is_empty() {
            base = match root_fallback {
                Some(fallback) => fallback.to_string(),
                None => element.kind.fallback_name().to_string(),
            };
        }

        let norm = element.norm.as_str();
        let algorithm = self.mappings.algorithms.first_match(norm).map(str::to_owned);
        let backend = self.mappings.backend.first_match(norm).map(str::to_owned);
        let nfr_hit = self.mappings.nfrs.first_match(norm).is_some();
        let integration_hit = self.mappings.integration.first_match(norm).is_some();

        // One descriptive suffix for traceability; algorithms take
        // precedence over backend when both tables match.
        if let Some(category) = algorithm.as_deref().or(backend.as_deref()) {
            let suffix = to_identifier(category);
            if !suffix.is_empty() {
                base.push('_');
                base.push_str(&suffix);
            }
        }

        let name = self.unique_name(base);
        if algorithm.is_some() {
            self.algo_features.push(name.clone());
        }
        if nfr_hit {
            self.nfr_features.push(name.clone());
        }
        if backend.is_some() {
            self.backend_hit = true;
        }
        if integration_hit {
            self.integration_hit = true;
        }
        self.names.insert(element.id.clone(), name.clone());
        name
    }

    fn unique_name(&mut self, base: String) -> String {
        if self.used_names.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.used_names.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Relationship;

    fn element(id: &str, kind: ElementKind, label: &str) -> IntentionalElement {
        let mut e = IntentionalElement::new(id, kind, label);
        e.norm = crate::text::normalize_label(&e.label);
        e
    }

    fn lab_graph() -> ModelGraph {
        let mut g = ModelGraph::new();
        g.add_element(element("a1", ElementKind::Actor, "Lab"));
        g.add_element(element("g1", ElementKind::Goal, "Analizar muestra"));
        g.add_element(element("t1", ElementKind::Task, "Método A"));
        g.add_element(element("t2", ElementKind::Task, "Método B"));
        g.add_relationship(Relationship::new(RelationshipKind::MeansEnd, "g1", "t1"));
        g.add_relationship(Relationship::new(RelationshipKind::MeansEnd, "g1", "t2"));
        g
    }

    fn lab_mappings() -> MappingSet {
        let mut set = MappingSet::empty();
        set.algorithms.insert("metodo a", "MonteCarlo");
        set.algorithms.insert("metodo b", "MolecularDynamics");
        set
    }

    #[test]
    fn test_actor_heads_the_tree() {
        let tree = build_tree(&lab_graph(), &lab_mappings()).unwrap();
        assert_eq!(tree.root.name, "Lab");
        assert_eq!(tree.root.children.len(), 1);

        let goal = &tree.root.children[0];
        assert_eq!(goal.name, "Analizar_muestra");
        assert_eq!(goal.cardinality, Cardinality::Mandatory);
    }

    #[test]
    fn test_means_end_tasks_form_alternative_group() {
        let tree = build_tree(&lab_graph(), &lab_mappings()).unwrap();
        let goal = &tree.root.children[0];
        assert_eq!(goal.group, GroupKind::Alternative);
        let names: Vec<_> = goal.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Metodo_A_MonteCarlo", "Metodo_B_MolecularDynamics"]);
    }

    #[test]
    fn test_decomposition_between_tasks_blocks_alternative() {
        let mut g = lab_graph();
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "t1", "t2"));
        let tree = build_tree(&g, &lab_mappings()).unwrap();
        let goal = &tree.root.children[0];
        assert_eq!(goal.group, GroupKind::And);
    }

    #[test]
    fn test_no_root_candidate_fails() {
        let mut g = ModelGraph::new();
        g.add_element(element("t1", ElementKind::Task, "Tarea"));
        g.add_element(element("r1", ElementKind::Resource, "Recurso"));
        let err = build_tree(&g, &MappingSet::empty()).unwrap_err();
        assert!(matches!(err, TransformError::UnresolvedHierarchy(_)));
    }

    #[test]
    fn test_without_actor_busiest_element_is_root() {
        let mut g = ModelGraph::new();
        g.add_element(element("g1", ElementKind::Goal, "Meta"));
        g.add_element(element("t1", ElementKind::Task, "Tarea uno"));
        g.add_element(element("t2", ElementKind::Task, "Tarea dos"));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "g1", "t1"));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "g1", "t2"));
        let tree = build_tree(&g, &MappingSet::empty()).unwrap();
        assert_eq!(tree.root.name, "Meta");
        assert_eq!(tree.root.children.len(), 2);
        assert_eq!(tree.root.group, GroupKind::And);
    }

    #[test]
    fn test_dependency_becomes_requires() {
        let mut g = ModelGraph::new();
        g.add_element(element("a1", ElementKind::Actor, "Lab"));
        g.add_element(element("t1", ElementKind::Task, "Extraer datos"));
        g.add_element(element("r1", ElementKind::Resource, "Base de datos"));
        g.add_relationship(Relationship::new(RelationshipKind::Dependency, "t1", "r1"));
        let tree = build_tree(&g, &MappingSet::empty()).unwrap();

        assert!(tree.contains_feature("Extraer_datos"));
        assert!(tree.contains_feature("Base_de_datos"));
        assert_eq!(
            tree.constraints,
            vec![Constraint::requires("Extraer_datos", "Base_de_datos")]
        );
    }

    #[test]
    fn test_negative_contribution_becomes_excludes() {
        let mut g = ModelGraph::new();
        g.add_element(element("a1", ElementKind::Actor, "Lab"));
        g.add_element(element("t1", ElementKind::Task, "Cachear resultados"));
        g.add_element(element("s1", ElementKind::Softgoal, "Precisión"));
        g.add_relationship(
            Relationship::new(RelationshipKind::Contribution, "t1", "s1")
                .with_polarity(ContributionPolarity::Break),
        );
        let tree = build_tree(&g, &MappingSet::empty()).unwrap();
        assert_eq!(
            tree.constraints,
            vec![Constraint::excludes("Cachear_resultados", "Precision")]
        );
    }

    #[test]
    fn test_help_contribution_child_is_optional() {
        let mut g = ModelGraph::new();
        g.add_element(element("a1", ElementKind::Actor, "Lab"));
        g.add_element(element("s1", ElementKind::Softgoal, "Rendimiento"));
        g.add_element(element("t1", ElementKind::Task, "Cachear"));
        g.add_relationship(
            Relationship::new(RelationshipKind::Contribution, "t1", "s1")
                .with_polarity(ContributionPolarity::Help),
        );
        let tree = build_tree(&g, &MappingSet::empty()).unwrap();

        // Softgoal is an orphan under the root; the helper hangs beneath
        // it as optional.
        let softgoal = tree
            .root
            .children
            .iter()
            .find(|c| c.name == "Rendimiento")
            .unwrap();
        assert_eq!(softgoal.children.len(), 1);
        assert_eq!(softgoal.children[0].name, "Cachear");
        assert_eq!(softgoal.children[0].cardinality, Cardinality::Optional);
    }

    #[test]
    fn test_make_contribution_child_is_mandatory() {
        let mut g = ModelGraph::new();
        g.add_element(element("a1", ElementKind::Actor, "Lab"));
        g.add_element(element("s1", ElementKind::Softgoal, "Trazabilidad"));
        g.add_element(element("t1", ElementKind::Task, "Registrar"));
        g.add_relationship(
            Relationship::new(RelationshipKind::Contribution, "t1", "s1")
                .with_polarity(ContributionPolarity::Make),
        );
        let tree = build_tree(&g, &MappingSet::empty()).unwrap();
        let softgoal = tree
            .root
            .children
            .iter()
            .find(|c| c.name == "Trazabilidad")
            .unwrap();
        assert_eq!(softgoal.children[0].cardinality, Cardinality::Mandatory);
    }

    #[test]
    fn test_backend_siblings_coerced_to_alternative() {
        let mut g = ModelGraph::new();
        g.add_element(element("a1", ElementKind::Actor, "Lab"));
        g.add_element(element("g1", ElementKind::Goal, "Desplegar"));
        g.add_element(element("r1", ElementKind::Resource, "Servidor local"));
        g.add_element(element("r2", ElementKind::Resource, "Servidor nube"));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "g1", "r1"));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "g1", "r2"));

        let mut set = MappingSet::empty();
        set.backend.insert("servidor", "Hardware");
        let tree = build_tree(&g, &set).unwrap();

        let goal = &tree.root.children[0];
        assert_eq!(goal.group, GroupKind::Alternative);
        let names: Vec<_> = goal.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Servidor_local_Hardware", "Servidor_nube_Hardware"]);
    }

    #[test]
    fn test_backend_subset_becomes_excludes() {
        let mut g = ModelGraph::new();
        g.add_element(element("a1", ElementKind::Actor, "Lab"));
        g.add_element(element("g1", ElementKind::Goal, "Desplegar"));
        g.add_element(element("r1", ElementKind::Resource, "Servidor local"));
        g.add_element(element("r2", ElementKind::Resource, "Servidor nube"));
        g.add_element(element("t1", ElementKind::Task, "Configurar"));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "g1", "r1"));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "g1", "r2"));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "g1", "t1"));

        let mut set = MappingSet::empty();
        set.backend.insert("servidor", "Hardware");
        let tree = build_tree(&g, &set).unwrap();

        let goal = &tree.root.children[0];
        assert_eq!(goal.group, GroupKind::And);
        assert!(tree.constraints.contains(&Constraint::excludes(
            "Servidor_local_Hardware",
            "Servidor_nube_Hardware"
        )));
    }

    #[test]
    fn test_integration_siblings_coerced_to_or_group() {
        let mut g = ModelGraph::new();
        g.add_element(element("a1", ElementKind::Actor, "Lab"));
        g.add_element(element("g1", ElementKind::Goal, "Integrar"));
        g.add_element(element("r1", ElementKind::Resource, "API interna"));
        g.add_element(element("r2", ElementKind::Resource, "API externa"));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "g1", "r1"));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "g1", "r2"));

        let mut set = MappingSet::empty();
        set.integration.insert("api", "Api");
        let tree = build_tree(&g, &set).unwrap();
        assert_eq!(tree.root.children[0].group, GroupKind::Or);
    }

    #[test]
    fn test_algorithm_requires_every_nfr() {
        let mut g = lab_graph();
        g.add_element(element("s1", ElementKind::Softgoal, "Precisión"));
        let mut set = lab_mappings();
        set.nfrs.insert("precision", "Precision");
        let tree = build_tree(&g, &set).unwrap();

        assert!(tree.contains_feature("Precision"));
        assert!(tree.constraints.contains(&Constraint::requires(
            "Metodo_A_MonteCarlo",
            "Precision"
        )));
        assert!(tree.constraints.contains(&Constraint::requires(
            "Metodo_B_MolecularDynamics",
            "Precision"
        )));
    }

    #[test]
    fn test_default_backend_and_integration_features() {
        let mut set = MappingSet::empty();
        set.backend.insert("servidor", "Hardware");
        set.integration.insert("middleware", "Middleware");
        let mut g = ModelGraph::new();
        g.add_element(element("a1", ElementKind::Actor, "Lab"));
        g.add_element(element("g1", ElementKind::Goal, "Meta"));
        let tree = build_tree(&g, &set).unwrap();

        assert!(tree.contains_feature("Hardware"));
        assert!(tree.contains_feature("Middleware"));
    }

    #[test]
    fn test_duplicate_names_get_numeric_suffixes() {
        let mut g = ModelGraph::new();
        g.add_element(element("a1", ElementKind::Actor, "Lab"));
        g.add_element(element("g1", ElementKind::Goal, "Meta"));
        g.add_element(element("t1", ElementKind::Task, "Paso"));
        g.add_element(element("t2", ElementKind::Task, "Paso."));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "g1", "t1"));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "g1", "t2"));
        let tree = build_tree(&g, &MappingSet::empty()).unwrap();

        let mut names = tree.feature_names();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), tree.feature_names().len());
        assert!(tree.contains_feature("Paso"));
        assert!(tree.contains_feature("Paso_2"));
    }

    #[test]
    fn test_hierarchy_cycle_terminates() {
        let mut g = ModelGraph::new();
        g.add_element(element("a1", ElementKind::Actor, "Lab"));
        g.add_element(element("t1", ElementKind::Task, "Uno"));
        g.add_element(element("t2", ElementKind::Task, "Dos"));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "t1", "t2"));
        g.add_relationship(Relationship::new(RelationshipKind::Decomposition, "t2", "t1"));
        let tree = build_tree(&g, &MappingSet::empty()).unwrap();

        // Both tasks appear exactly once despite the cycle.
        assert!(tree.contains_feature("Uno"));
        assert!(tree.contains_feature("Dos"));
        assert_eq!(tree.feature_names().len(), 3);
    }

    #[test]
    fn test_constraint_referential_integrity() {
        let mut g = lab_graph();
        g.add_element(element("r1", ElementKind::Resource, "Base de datos"));
        g.add_relationship(Relationship::new(RelationshipKind::Dependency, "t1", "r1"));
        let tree = build_tree(&g, &lab_mappings()).unwrap();

        let names = tree.feature_names();
        for constraint in &tree.constraints {
            assert!(names.contains(&constraint.source.as_str()));
            assert!(names.contains(&constraint.target.as_str()));
        }
    }
}
