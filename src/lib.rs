//! # istar-uvl
//!
//! Transforms goal/intention models in the i* 2.0 notation (captured as a
//! diagram-editor XML export) into Universal Variability Language (UVL)
//! feature models.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! pipeline  → one-shot transform: XML bytes in, UVL text out
//!   ↓
//! uvl       → UVL serializer (feature hierarchy + constraints blocks)
//!   ↓
//! feature   → FeatureTree types, graph-to-tree builder
//!   ↓
//! normalize → label normalization, duplicate-element merging
//!   ↓
//! diagram   → style classification, XML event reader
//!   ↓
//! model     → ElementId, element/relationship kinds, ModelGraph
//!   ↓
//! mapping   → keyword → category lookup tables
//!   ↓
//! text      → label cleaning, identifier derivation
//! ```

/// Label cleaning, normalization, identifier derivation
pub mod text;

/// Transform error taxonomy
pub mod error;

/// Keyword → category lookup tables (algorithms, NFRs, backend, integration)
pub mod mapping;

/// Typed graph of intentional elements and relationships
pub mod model;

/// Diagram XML parsing: style classification + event reader
pub mod diagram;

/// Label normalization and duplicate-element merging
pub mod normalize;

/// Feature-tree types and the graph-to-tree builder
pub mod feature;

/// UVL text serialization
pub mod uvl;

/// One-shot transformation pipeline
pub mod pipeline;

// Re-export the surface most callers need.
pub use error::TransformError;
pub use feature::{build_tree, FeatureTree};
pub use mapping::{MappingSet, MappingTable};
pub use model::ModelGraph;
pub use pipeline::transform;
