//! Shape and edge style classification.
//!
//! The diagram editor encodes the i* notation visually: actors are stick
//! figures or boundary circles, goals are ovals, softgoals are clouds,
//! tasks are hexagons, resources are rectangles. Relationship kinds ride
//! on arrow styles. Both classifiers are pure functions over a closed
//! convention table, with an explicit `Unknown`/default fallback, so the
//! notation knowledge stays in one place.

use crate::model::{ContributionPolarity, ElementKind, RelationshipKind};
use crate::text::normalize_label;

/// Classify a shape style into an element kind.
///
/// An explicit `type` attribute (some exports tag shapes directly) wins
/// over style matching. A style that matches no known shape yields
/// [`ElementKind::Unknown`]; the element is retained either way.
pub fn classify_shape(style: &str, type_attr: Option<&str>) -> ElementKind {
    if let Some(kind) = type_attr.and_then(kind_from_type_attr) {
        return kind;
    }

    let style = style.to_ascii_lowercase();
    // Cloud must be checked before the oval markers: softgoal clouds often
    // carry ellipse geometry in the same style string.
    if has_marker(&style, &["istar.actor", "umlactor", "actor"]) {
        ElementKind::Actor
    } else if has_marker(&style, &["softgoal", "cloud"]) {
        ElementKind::Softgoal
    } else if has_marker(&style, &["istar.goal", "ellipse", "oval"]) {
        ElementKind::Goal
    } else if has_marker(&style, &["istar.task", "hexagon"]) {
        ElementKind::Task
    } else if has_marker(&style, &["istar.resource", "rectangle", "rounded=0", "rounded=1"]) {
        ElementKind::Resource
    } else {
        ElementKind::Unknown
    }
}

fn kind_from_type_attr(type_attr: &str) -> Option<ElementKind> {
    match normalize_label(type_attr).as_str() {
        "actor" | "agent" | "role" => Some(ElementKind::Actor),
        "goal" => Some(ElementKind::Goal),
        "task" => Some(ElementKind::Task),
        "resource" => Some(ElementKind::Resource),
        "softgoal" | "quality" => Some(ElementKind::Softgoal),
        _ => None,
    }
}

/// Classify an edge style (plus its cleaned label) into a relationship
/// kind and, for contributions, a polarity.
///
/// Unmatched edge styles default to [`RelationshipKind::Dependency`], the
/// most permissive relationship, rather than failing the parse. An edge
/// whose label is a contribution marker (`++`, `+`, `-`, `--`, make/help/
/// hurt/break) is a contribution even without a style token.
pub fn classify_edge(
    style: &str,
    label: &str,
) -> (RelationshipKind, Option<ContributionPolarity>) {
    let style = style.to_ascii_lowercase();
    let polarity = polarity_from_label(label);

    if has_marker(&style, &["decomposition", "andlink", "endarrow=cross", "startarrow=cross"]) {
        (RelationshipKind::Decomposition, None)
    } else if has_marker(&style, &["meansend", "means-end", "orlink", "endarrow=open"]) {
        (RelationshipKind::MeansEnd, None)
    } else if has_marker(&style, &["contribution"]) || polarity.is_some() {
        (
            RelationshipKind::Contribution,
            Some(polarity.unwrap_or(ContributionPolarity::Unknown)),
        )
    } else {
        // Covers explicit dependency styles and everything unrecognized.
        (RelationshipKind::Dependency, None)
    }
}

/// Polarity from a contribution-edge label.
fn polarity_from_label(label: &str) -> Option<ContributionPolarity> {
    match normalize_label(label).as_str() {
        "++" | "make" => Some(ContributionPolarity::Make),
        "+" | "help" => Some(ContributionPolarity::Help),
        "-" | "hurt" => Some(ContributionPolarity::Hurt),
        "--" | "break" => Some(ContributionPolarity::Break),
        _ => None,
    }
}

fn has_marker(style: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| style.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_shape_by_style() {
        assert_eq!(
            classify_shape("shape=umlActor;verticalLabelPosition=bottom;", None),
            ElementKind::Actor
        );
        assert_eq!(classify_shape("ellipse;whiteSpace=wrap;", None), ElementKind::Goal);
        assert_eq!(classify_shape("shape=cloud;whiteSpace=wrap;", None), ElementKind::Softgoal);
        assert_eq!(classify_shape("shape=hexagon;perimeter=hexagonPerimeter2;", None), ElementKind::Task);
        assert_eq!(classify_shape("rounded=0;whiteSpace=wrap;html=1;", None), ElementKind::Resource);
    }

    #[test]
    fn test_classify_shape_type_attr_wins() {
        assert_eq!(classify_shape("ellipse;", Some("task")), ElementKind::Task);
        assert_eq!(classify_shape("", Some("Softgoal")), ElementKind::Softgoal);
        assert_eq!(classify_shape("", Some("agent")), ElementKind::Actor);
    }

    #[test]
    fn test_classify_shape_unknown_is_retained_kind() {
        assert_eq!(classify_shape("rhombus;fillColor=#fff;", None), ElementKind::Unknown);
        assert_eq!(classify_shape("", None), ElementKind::Unknown);
        assert_eq!(classify_shape("ellipse;", Some("nonsense")), ElementKind::Goal);
    }

    #[test]
    fn test_classify_edge_kinds() {
        assert_eq!(
            classify_edge("endArrow=cross;html=1;", "").0,
            RelationshipKind::Decomposition
        );
        assert_eq!(
            classify_edge("endArrow=open;endFill=0;", "").0,
            RelationshipKind::MeansEnd
        );
        assert_eq!(
            classify_edge("edgeStyle=istar.dependency;", "").0,
            RelationshipKind::Dependency
        );
    }

    #[test]
    fn test_classify_edge_defaults_to_dependency() {
        assert_eq!(classify_edge("endArrow=block;html=1;", "").0, RelationshipKind::Dependency);
        assert_eq!(classify_edge("", "").0, RelationshipKind::Dependency);
    }

    #[test]
    fn test_classify_edge_contribution_polarity() {
        assert_eq!(
            classify_edge("contribution;", "help"),
            (RelationshipKind::Contribution, Some(ContributionPolarity::Help))
        );
        assert_eq!(
            classify_edge("", "++"),
            (RelationshipKind::Contribution, Some(ContributionPolarity::Make))
        );
        assert_eq!(
            classify_edge("", "--"),
            (RelationshipKind::Contribution, Some(ContributionPolarity::Break))
        );
        assert_eq!(
            classify_edge("", "-"),
            (RelationshipKind::Contribution, Some(ContributionPolarity::Hurt))
        );
        assert_eq!(
            classify_edge("contribution;", ""),
            (RelationshipKind::Contribution, Some(ContributionPolarity::Unknown))
        );
    }
}
