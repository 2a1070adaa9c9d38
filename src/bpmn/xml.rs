//! This module provides serialization of a process graph as a BPMN 2.0 XML
//! document, including the diagram interchange section with shapes and edges.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use super::{NodeKind, ProcessGraph};

const MODEL_NS: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
const BPMNDI_NS: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
const DC_NS: &str = "http://www.omg.org/spec/DD/20100524/DC";
const DI_NS: &str = "http://www.omg.org/spec/DD/20100524/DI";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const TARGET_NS: &str = "http://bpmn.io/schema/bpmn";

/// Every shape is rendered with the same fixed bounds
const SHAPE_WIDTH: i32 = 100;
const SHAPE_HEIGHT: i32 = 80;
/// Waypoints aim at the approximate center of a shape
const WAYPOINT_OFFSET_X: i32 = 50;
const WAYPOINT_OFFSET_Y: i32 = 40;

/// Flow nodes all serialize with just an ID and a name.
/// This macro generates structs with these fields
macro_rules! def_node_struct {
    ($($name:ident),*) => {$(
        #[derive(Debug, Serialize)]
        struct $name {
            #[serde(rename = "@id")]
            id: String,
            #[serde(rename = "@name")]
            name: String,
        }
    )*};
}

def_node_struct!(StartEvent, EndEvent, Task, ExclusiveGateway);

#[derive(Debug, Serialize)]
struct Lane {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "flowNodeRef")]
    flow_node_refs: Vec<String>,
}

#[derive(Debug, Serialize)]
struct LaneSet {
    #[serde(rename = "@id")]
    id: &'static str,
    #[serde(rename = "lane")]
    lanes: Vec<Lane>,
}

#[derive(Debug, Serialize)]
struct ConditionExpression {
    #[serde(rename = "@xsi:type")]
    expression_type: &'static str,
    #[serde(rename = "$text")]
    text: String,
}

#[derive(Debug, Serialize)]
struct SequenceFlow {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@sourceRef")]
    source_ref: String,
    #[serde(rename = "@targetRef")]
    target_ref: String,
    #[serde(rename = "conditionExpression")]
    condition: Option<ConditionExpression>,
}

#[derive(Debug, Serialize)]
struct Process {
    #[serde(rename = "@id")]
    id: &'static str,
    #[serde(rename = "@isExecutable")]
    is_executable: &'static str,
    #[serde(rename = "laneSet")]
    lane_set: LaneSet,
    #[serde(rename = "startEvent")]
    start_events: Vec<StartEvent>,
    #[serde(rename = "task")]
    tasks: Vec<Task>,
    #[serde(rename = "exclusiveGateway")]
    exclusive_gateways: Vec<ExclusiveGateway>,
    #[serde(rename = "endEvent")]
    end_events: Vec<EndEvent>,
    #[serde(rename = "sequenceFlow")]
    sequence_flows: Vec<SequenceFlow>,
}

#[derive(Debug, Serialize)]
struct Bounds {
    #[serde(rename = "@x")]
    x: i32,
    #[serde(rename = "@y")]
    y: i32,
    #[serde(rename = "@width")]
    width: i32,
    #[serde(rename = "@height")]
    height: i32,
}

#[derive(Debug, Serialize)]
struct Shape {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@bpmnElement")]
    bpmn_element: String,
    #[serde(rename = "dc:Bounds")]
    bounds: Bounds,
}

#[derive(Debug, Serialize)]
struct Waypoint {
    #[serde(rename = "@x")]
    x: i32,
    #[serde(rename = "@y")]
    y: i32,
}

#[derive(Debug, Serialize)]
struct Edge {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@bpmnElement")]
    bpmn_element: String,
    #[serde(rename = "di:waypoint")]
    waypoints: Vec<Waypoint>,
}

#[derive(Debug, Serialize)]
struct Plane {
    #[serde(rename = "@id")]
    id: &'static str,
    #[serde(rename = "@bpmnElement")]
    bpmn_element: &'static str,
    #[serde(rename = "bpmndi:BPMNEdge")]
    edges: Vec<Edge>,
    #[serde(rename = "bpmndi:BPMNShape")]
    shapes: Vec<Shape>,
}

#[derive(Debug, Serialize)]
struct BpmnDiagram {
    #[serde(rename = "@id")]
    id: &'static str,
    #[serde(rename = "bpmndi:BPMNPlane")]
    plane: Plane,
}

/// Internal representation of a BPMN 2.0 file.
/// This is the format the process graph is serialized to.
#[derive(Debug, Serialize)]
#[serde(rename = "definitions")]
pub struct Definitions {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "@xmlns:xsi")]
    xmlns_xsi: &'static str,
    #[serde(rename = "@xmlns:bpmndi")]
    xmlns_bpmndi: &'static str,
    #[serde(rename = "@xmlns:dc")]
    xmlns_dc: &'static str,
    #[serde(rename = "@xmlns:di")]
    xmlns_di: &'static str,
    #[serde(rename = "@id")]
    id: &'static str,
    #[serde(rename = "@targetNamespace")]
    target_namespace: &'static str,
    #[serde(rename = "process")]
    process: Process,
    #[serde(rename = "bpmndi:BPMNDiagram")]
    diagram: BpmnDiagram,
}

/// Display a BPMN file as indented XML
impl Display for Definitions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        let mut ser = quick_xml::se::Serializer::new(f);
        ser.indent(' ', 2);
        self.serialize(ser).map(|_| ()).map_err(|_| std::fmt::Error)
    }
}

/// Convert a process graph to a BPMN file
impl From<&ProcessGraph> for Definitions {
    fn from(graph: &ProcessGraph) -> Self {
        let lanes = graph
            .lanes
            .iter()
            .map(|lane| Lane {
                id: lane.id.clone(),
                name: lane.name.clone(),
                flow_node_refs: lane.node_refs.clone(),
            })
            .collect();

        let mut start_events = Vec::new();
        let mut end_events = Vec::new();
        let mut tasks = Vec::new();
        let mut exclusive_gateways = Vec::new();
        for node in &graph.nodes {
            let id = node.id.clone();
            let name = node.name.clone();
            match node.kind {
                NodeKind::StartEvent => start_events.push(StartEvent { id, name }),
                NodeKind::EndEvent => end_events.push(EndEvent { id, name }),
                NodeKind::Task => tasks.push(Task { id, name }),
                NodeKind::ExclusiveGateway => exclusive_gateways.push(ExclusiveGateway { id, name }),
            }
        }

        let mut sequence_flows = Vec::new();
        let mut edges = Vec::new();
        for (i, flow) in graph.flows.iter().enumerate() {
            let flow_id = format!("Flow_{}", i + 1);
            let condition = if flow.condition.is_empty() {
                None
            } else {
                Some(ConditionExpression {
                    expression_type: "tFormalExpression",
                    text: flow.condition.clone(),
                })
            };
            sequence_flows.push(SequenceFlow {
                id: flow_id.clone(),
                source_ref: flow.source_id.clone(),
                target_ref: flow.target_id.clone(),
                condition,
            });

            // The .expect() calls are safe because every flow endpoint was
            // created as a node before the flow referencing it
            let waypoint = |id: &str| {
                let node = graph.node(id).expect("flow endpoint exists in the graph");
                Waypoint {
                    x: node.x + WAYPOINT_OFFSET_X,
                    y: node.y + WAYPOINT_OFFSET_Y,
                }
            };
            edges.push(Edge {
                id: format!("{}_di", flow_id),
                bpmn_element: flow_id,
                waypoints: vec![waypoint(&flow.source_id), waypoint(&flow.target_id)],
            });
        }

        let shapes = graph
            .nodes
            .iter()
            .map(|node| Shape {
                id: format!("{}_di", node.id),
                bpmn_element: node.id.clone(),
                bounds: Bounds {
                    x: node.x,
                    y: node.y,
                    width: SHAPE_WIDTH,
                    height: SHAPE_HEIGHT,
                },
            })
            .collect();

        Definitions {
            xmlns: MODEL_NS,
            xmlns_xsi: XSI_NS,
            xmlns_bpmndi: BPMNDI_NS,
            xmlns_dc: DC_NS,
            xmlns_di: DI_NS,
            id: "Definitions_1",
            target_namespace: TARGET_NS,
            process: Process {
                id: "Process_1",
                is_executable: "false",
                lane_set: LaneSet {
                    id: "LaneSet_1",
                    lanes,
                },
                start_events,
                tasks,
                exclusive_gateways,
                end_events,
                sequence_flows,
            },
            diagram: BpmnDiagram {
                id: "BPMNDiagram_1",
                plane: Plane {
                    id: "BPMNPlane_1",
                    bpmn_element: "Process_1",
                    edges,
                    shapes,
                },
            },
        }
    }
}
