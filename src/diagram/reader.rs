//! Event-based diagram XML reader.
//!
//! Reads an mxGraph export and assembles a [`ModelGraph`]. The document
//! layout is loosely structured:
//!
//! ```xml
//! <mxGraphModel>
//!   <root>
//!     <mxCell id="0"/><mxCell id="1" parent="0"/>
//!     <mxCell id="a1" value="Lab" style="shape=umlActor;" vertex="1" parent="1"/>
//!     <object id="g1" label="Analizar muestra" type="goal">
//!       <mxCell style="ellipse;" vertex="1" parent="1"/>
//!     </object>
//!     <mxCell id="e1" style="endArrow=open;" edge="1" source="g1" target="t1"/>
//!   </root>
//! </mxGraphModel>
//! ```
//!
//! Vertex cells (bare or `<object>`-wrapped) become elements, edge cells
//! become relationships. Parsing is pure: the only output is the graph.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::style::{classify_edge, classify_shape};
use crate::error::TransformError;
use crate::model::{IntentionalElement, ModelGraph, Relationship};
use crate::text::clean_label;

/// Read diagram XML bytes into a model graph.
///
/// Fails with [`TransformError::MalformedDiagram`] when the document is
/// not well-formed XML or lacks the expected shape/edge container.
pub fn read_diagram(input: &[u8]) -> Result<ModelGraph, TransformError> {
    DiagramReader::new().read(input)
}

/// Pending shape collected during the event pass.
struct PendingShape {
    id: String,
    style: String,
    raw_label: String,
    type_attr: Option<String>,
}

/// Pending edge collected during the event pass.
struct PendingEdge {
    source: Option<String>,
    target: Option<String>,
    style: String,
    raw_label: String,
}

/// `<object>` wrapper context: carries id/label/type for the inner cell.
struct ObjectContext {
    id: Option<String>,
    label: String,
    type_attr: Option<String>,
}

struct DiagramReader {
    shapes: Vec<PendingShape>,
    edges: Vec<PendingEdge>,
    /// Stack of open `<object>` wrappers (exports never nest them, but the
    /// stack keeps start/end bookkeeping honest).
    object_stack: Vec<ObjectContext>,
    saw_container: bool,
}

impl DiagramReader {
    fn new() -> Self {
        Self {
            shapes: Vec::new(),
            edges: Vec::new(),
            object_stack: Vec::new(),
            saw_container: false,
        }
    }

    fn read(mut self, input: &[u8]) -> Result<ModelGraph, TransformError> {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    self.handle_start_element(e)?;
                }
                Ok(Event::Empty(ref e)) => {
                    self.handle_start_element(e)?;
                    self.handle_end_element(tag_name(e)?.to_string());
                }
                Ok(Event::End(ref e)) => {
                    let name = std::str::from_utf8(e.name().as_ref())
                        .map_err(|err| TransformError::malformed(format!("invalid tag name: {err}")))?
                        .to_string();
                    self.handle_end_element(name);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(TransformError::malformed(format!(
                        "XML parse error at position {}: {e}",
                        reader.error_position()
                    )));
                }
                _ => {}
            }
            buf.clear();
        }

        if !self.saw_container {
            return Err(TransformError::malformed(
                "document has no mxGraphModel/root container (compressed export?)",
            ));
        }

        Ok(self.build_graph())
    }

    fn handle_start_element(&mut self, e: &BytesStart<'_>) -> Result<(), TransformError> {
        match tag_name(e)? {
            "mxGraphModel" | "root" => {
                self.saw_container = true;
                Ok(())
            }
            "object" | "UserObject" => self.handle_object(e),
            "mxCell" => self.handle_cell(e),
            _ => Ok(()),
        }
    }

    fn handle_end_element(&mut self, tag: String) {
        if tag == "object" || tag == "UserObject" {
            self.object_stack.pop();
        }
    }

    fn handle_object(&mut self, e: &BytesStart<'_>) -> Result<(), TransformError> {
        let mut ctx = ObjectContext {
            id: None,
            label: String::new(),
            type_attr: None,
        };
        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|err| TransformError::malformed(format!("attribute error: {err}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|err| TransformError::malformed(format!("attribute key error: {err}")))?;
            let value = attr
                .unescape_value()
                .map_err(|err| TransformError::malformed(format!("attribute value error: {err}")))?
                .to_string();
            match key {
                "id" => ctx.id = Some(value),
                "label" => ctx.label = value,
                "type" => ctx.type_attr = Some(value),
                _ => {}
            }
        }
        self.object_stack.push(ctx);
        Ok(())
    }

    fn handle_cell(&mut self, e: &BytesStart<'_>) -> Result<(), TransformError> {
        let mut id: Option<String> = None;
        let mut value = String::new();
        let mut style = String::new();
        let mut is_vertex = false;
        let mut is_edge = false;
        let mut source: Option<String> = None;
        let mut target: Option<String> = None;

        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|err| TransformError::malformed(format!("attribute error: {err}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|err| TransformError::malformed(format!("attribute key error: {err}")))?;
            let val = attr
                .unescape_value()
                .map_err(|err| TransformError::malformed(format!("attribute value error: {err}")))?
                .to_string();
            match key {
                "id" => id = Some(val),
                "value" => value = val,
                "style" => style = val,
                "vertex" => is_vertex = val == "1",
                "edge" => is_edge = val == "1",
                "source" => source = Some(val),
                "target" => target = Some(val),
                _ => {}
            }
        }

        // The wrapping <object> carries id/label/type for its inner cell.
        let ctx = self.object_stack.last();
        let id = id.or_else(|| ctx.and_then(|c| c.id.clone()));
        let raw_label = if value.is_empty() {
            ctx.map(|c| c.label.clone()).unwrap_or_default()
        } else {
            value
        };
        let type_attr = ctx.and_then(|c| c.type_attr.clone());

        if is_edge {
            self.edges.push(PendingEdge {
                source,
                target,
                style,
                raw_label,
            });
        } else if is_vertex {
            let Some(id) = id else {
                tracing::warn!("vertex cell without an id, skipped");
                return Ok(());
            };
            self.shapes.push(PendingShape {
                id,
                style,
                raw_label,
                type_attr,
            });
        }
        // Cells that are neither vertex nor edge (the structural id=0/id=1
        // cells) carry no model content.
        Ok(())
    }

    fn build_graph(self) -> ModelGraph {
        let mut graph = ModelGraph::new();

        for shape in self.shapes {
            let kind = classify_shape(&shape.style, shape.type_attr.as_deref());
            if graph.contains(&shape.id.as_str().into()) {
                tracing::warn!(id = %shape.id, "duplicate cell id, later shape replaces earlier");
            }
            graph.add_element(IntentionalElement::new(shape.id, kind, shape.raw_label));
        }

        for edge in self.edges {
            let (Some(source), Some(target)) = (edge.source, edge.target) else {
                tracing::debug!("edge with a dangling endpoint, dropped");
                continue;
            };
            let (source, target): (crate::model::ElementId, crate::model::ElementId) =
                (source.into(), target.into());
            if !graph.contains(&source) || !graph.contains(&target) {
                tracing::debug!(%source, %target, "edge references a non-shape cell, dropped");
                continue;
            }
            let label = clean_label(&edge.raw_label);
            let (kind, polarity) = classify_edge(&edge.style, &label);
            let mut relationship = Relationship::new(kind, source, target);
            if let Some(polarity) = polarity {
                relationship = relationship.with_polarity(polarity);
            }
            graph.add_relationship(relationship);
        }

        graph
    }
}

fn tag_name<'a>(e: &'a BytesStart<'_>) -> Result<&'a str, TransformError> {
    std::str::from_utf8(e.name().into_inner())
        .map_err(|err| TransformError::malformed(format!("invalid tag name: {err}")))
}
