//! Renders a canonical model as an mxGraph (draw.io) document.

mod layout;

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::json::extract_model;
use crate::model::{DomainModel, Relationship, RelationshipKind};
use crate::text::fold;

pub use layout::{Geometry, LayoutCursor};

const CLASS_STYLE: &str = "swimlane;fontStyle=1;align=center;verticalAlign=top;childLayout=stackLayout;\
horizontal=1;startSize=26;horizontalStack=0;resizeParent=1;resizeParentMax=0;resizeLast=0;\
collapsible=1;marginBottom=0;html=1;";
const ATTRIBUTE_STYLE: &str = "text;strokeColor=none;fillColor=none;align=left;verticalAlign=top;\
spacingLeft=4;spacingRight=4;overflow=hidden;rotatable=0;points=[[0,0.5],[1,0.5]];\
portConstraint=eastwest;html=1;";
const SOURCE_LABEL_STYLE: &str = "edgeLabel;resizable=0;html=1;align=left;verticalAlign=bottom;";
const TARGET_LABEL_STYLE: &str = "edgeLabel;resizable=0;html=1;align=right;verticalAlign=bottom;";
const DIAGNOSTIC_STYLE: &str = "text;html=1;whiteSpace=wrap;strokeColor=#b85450;fillColor=#f8cecc;";
const DIAGNOSTIC_SIZE: (u32, u32) = (320, 60);

/// Edge style per relationship kind. Diamonds sit on the owning (source)
/// end, the inheritance triangle on the parent (target) end.
#[must_use]
pub fn edge_style(kind: RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::Association | RelationshipKind::Dependency => {
            "endArrow=none;html=1;edgeStyle=orthogonalEdgeStyle;"
        }
        RelationshipKind::Composition => {
            "startArrow=diamondThin;startFill=1;startSize=14;endArrow=none;html=1;edgeStyle=orthogonalEdgeStyle;"
        }
        RelationshipKind::Aggregation => {
            "startArrow=diamondThin;startFill=0;startSize=14;endArrow=none;html=1;edgeStyle=orthogonalEdgeStyle;"
        }
        RelationshipKind::Inheritance => {
            "endArrow=block;endFill=0;endSize=12;html=1;edgeStyle=orthogonalEdgeStyle;"
        }
        RelationshipKind::Control => "endArrow=open;endFill=0;html=1;edgeStyle=orthogonalEdgeStyle;",
    }
}

/// Serialized document plus what went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    pub xml: String,
    /// Class vertices, or the single diagnostic vertex.
    pub vertices: usize,
    pub edges: usize,
    /// Relationships whose source or target class was not in the model.
    pub dropped_edges: usize,
    pub diagnostic: Option<String>,
}

impl Diagram {
    pub fn is_diagnostic(&self) -> bool {
        self.diagnostic.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiagramSerializer {
    layout: LayoutConfig,
}

impl DiagramSerializer {
    #[must_use]
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    pub fn serialize(&self, model: &DomainModel) -> Diagram {
        let mut cursor = LayoutCursor::new(self.layout);
        let mut cells = Vec::new();

        let mut graph: DiGraph<String, &Relationship> = DiGraph::new();
        let mut by_name: HashMap<String, NodeIndex> = HashMap::new();

        for class in &model.classes {
            let node = graph.add_node(class_id(graph.node_count()));
            by_name.entry(fold(&class.name)).or_insert(node);

            let id = &graph[node];
            let geometry = cursor.place(cursor.class_height(class.attributes.len()));
            cells.push(vertex(id, &class.name, CLASS_STYLE, "1", &geometry));
            for (row, attribute) in class.attributes.iter().enumerate() {
                let attribute_id = format!("{id}-attr-{}", row + 1);
                cells.push(vertex(&attribute_id, &attribute.label(), ATTRIBUTE_STYLE, id, &cursor.row(row)));
            }
        }

        let mut dropped_edges = 0;
        for (class, source) in model.classes.iter().zip(graph.node_indices().collect::<Vec<_>>()) {
            for relationship in &class.relationships {
                match by_name.get(&fold(&relationship.target)) {
                    Some(&target) => {
                        graph.add_edge(source, target, relationship);
                    }
                    None => {
                        warn!(
                            source = %class.name,
                            target = %relationship.target,
                            kind = %relationship.kind,
                            "Dropping relationship to unknown class"
                        );
                        dropped_edges += 1;
                    }
                }
            }
        }

        for (n, edge) in graph.edge_references().enumerate() {
            let id = format!("edge-{}", n + 1);
            let relationship = edge.weight();
            let (low, high) = relationship.cardinality.split();
            cells.push(format!(
                r#"<mxCell id="{id}" value="" style="{}" edge="1" parent="1" source="{}" target="{}"><mxGeometry relative="1" as="geometry"/></mxCell>"#,
                edge_style(relationship.kind),
                graph[edge.source()],
                graph[edge.target()],
            ));
            cells.push(edge_label(&format!("{id}-source"), &low, SOURCE_LABEL_STYLE, &id, -1));
            cells.push(edge_label(&format!("{id}-target"), &high, TARGET_LABEL_STYLE, &id, 1));
        }

        debug!(
            vertices = graph.node_count(),
            edges = graph.edge_count(),
            dropped_edges,
            "Serialized diagram"
        );

        Diagram {
            xml: document(&cells),
            vertices: graph.node_count(),
            edges: graph.edge_count(),
            dropped_edges,
            diagnostic: None,
        }
    }

    /// Accepts canonical JSON, possibly wrapped in prose or a fenced
    /// block. Unusable input yields a diagnostic document, never an error.
    pub fn serialize_json(&self, raw: &str) -> Diagram {
        match extract_model(raw) {
            Ok(model) => self.serialize(&model),
            Err(e) => {
                warn!(error = %e, "Cannot read model, emitting diagnostic diagram");
                self.diagnostic(&e.to_string())
            }
        }
    }

    /// Minimal well-formed document holding one vertex with `message`.
    pub fn diagnostic(&self, message: &str) -> Diagram {
        let geometry = Geometry {
            x: self.layout.origin_x,
            y: self.layout.origin_y,
            width: DIAGNOSTIC_SIZE.0,
            height: DIAGNOSTIC_SIZE.1,
        };
        let cell = vertex("diagnostic", message, DIAGNOSTIC_STYLE, "1", &geometry);
        Diagram {
            xml: document(&[cell]),
            vertices: 1,
            edges: 0,
            dropped_edges: 0,
            diagnostic: Some(message.to_string()),
        }
    }
}

fn class_id(index: usize) -> String {
    format!("class-{}", index + 1)
}

fn document(cells: &[String]) -> String {
    let mut xml = String::from(
        r#"<mxGraphModel dx="1000" dy="800" grid="1" gridSize="10" guides="1" tooltips="1" connect="1" arrows="1" fold="1" page="1" pageScale="1" math="0" shadow="0">"#,
    );
    xml.push_str("\n  <root>\n    <mxCell id=\"0\"/>\n    <mxCell id=\"1\" parent=\"0\"/>\n");
    for cell in cells {
        xml.push_str("    ");
        xml.push_str(cell);
        xml.push('\n');
    }
    xml.push_str("  </root>\n</mxGraphModel>\n");
    xml
}

fn vertex(id: &str, value: &str, style: &str, parent: &str, geometry: &Geometry) -> String {
    format!(
        r#"<mxCell id="{id}" value="{}" style="{style}" vertex="1" parent="{parent}"><mxGeometry x="{}" y="{}" width="{}" height="{}" as="geometry"/></mxCell>"#,
        escape(value),
        geometry.x,
        geometry.y,
        geometry.width,
        geometry.height,
    )
}

fn edge_label(id: &str, value: &str, style: &str, parent: &str, end: i8) -> String {
    format!(
        r#"<mxCell id="{id}" value="{}" style="{style}" vertex="1" connectable="0" parent="{parent}"><mxGeometry x="{end}" relative="1" as="geometry"><mxPoint as="offset"/></mxGeometry></mxCell>"#,
        escape(value),
    )
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#xa;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}
