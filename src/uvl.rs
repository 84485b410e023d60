//! UVL text serialization.
//!
//! Renders a [`FeatureTree`] into the two top-level UVL blocks: the
//! tab-indented feature hierarchy and the constraints block, one
//! `requires`/`excludes` statement per line.
//!
//! ```text
//! features
//!     Lab
//!         mandatory
//!             Analizar_muestra
//!                 alternatives
//!                     Metodo_A_MonteCarlo
//!                     Metodo_B_MolecularDynamics
//!
//! constraints
//!     Extraer_datos requires Base_de_datos
//! ```
//!
//! Output is deterministic: child order is tree order, no incidental
//! hashing order leaks into the text. Identical trees serialize to
//! byte-identical text.

use rustc_hash::FxHashSet;

use crate::error::TransformError;
use crate::feature::{Cardinality, FeatureNode, FeatureTree, GroupKind};

/// Serialize a feature tree to UVL text.
///
/// Fails with [`TransformError::UnserializableTree`] when a constraint
/// references a feature name absent from the tree. The builder upholds
/// that invariant, so the check is defensive.
pub fn write_uvl(tree: &FeatureTree) -> Result<String, TransformError> {
    let names: FxHashSet<&str> = tree.feature_names().into_iter().collect();
    for constraint in &tree.constraints {
        for endpoint in [&constraint.source, &constraint.target] {
            if !names.contains(endpoint.as_str()) {
                return Err(TransformError::unserializable(format!(
                    "constraint references unknown feature '{endpoint}'"
                )));
            }
        }
    }

    let mut out = String::new();
    out.push_str("features\n");
    write_node(&mut out, &tree.root, 1);

    if !tree.constraints.is_empty() {
        out.push('\n');
        out.push_str("constraints\n");
        for constraint in &tree.constraints {
            out.push('\t');
            out.push_str(&constraint.source);
            out.push(' ');
            out.push_str(&constraint.kind.to_string());
            out.push(' ');
            out.push_str(&constraint.target);
            out.push('\n');
        }
    }

    Ok(out)
}

fn write_node(out: &mut String, node: &FeatureNode, depth: usize) {
    push_line(out, depth, &node.name);
    if node.children.is_empty() {
        return;
    }

    match node.group {
        GroupKind::And => {
            // Children bucket into mandatory/optional blocks, preserving
            // their relative order inside each block.
            for (header, cardinality) in [
                ("mandatory", Cardinality::Mandatory),
                ("optional", Cardinality::Optional),
            ] {
                let bucket: Vec<&FeatureNode> = node
                    .children
                    .iter()
                    .filter(|c| c.cardinality == cardinality)
                    .collect();
                if bucket.is_empty() {
                    continue;
                }
                push_line(out, depth + 1, header);
                for child in bucket {
                    write_node(out, child, depth + 2);
                }
            }
        }
        GroupKind::Or => {
            push_line(out, depth + 1, "or");
            for child in &node.children {
                write_node(out, child, depth + 2);
            }
        }
        GroupKind::Alternative => {
            push_line(out, depth + 1, "alternatives");
            for child in &node.children {
                write_node(out, child, depth + 2);
            }
        }
    }
}

fn push_line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push('\t');
    }
    out.push_str(text);
    out.push('\n');
}
