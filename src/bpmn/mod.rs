//! This module defines the data structures for BPMN process graphs and provides
//! the conversion from an ordered step list into a laid-out, lane-partitioned graph.
//!
//! Layout is a fixed grid: elements advance left to right in step order, each lane
//! occupies a horizontal band, and start/end events sit above the bands.

mod xml;

pub use xml::Definitions;

use std::collections::HashMap;

use crate::error::Error;
use crate::steps::{StepKind, StepRecord};

/// Horizontal distance between consecutive elements
const SPACING_X: i32 = 200;
/// Vertical distance between lane bands
const SPACING_Y: i32 = 150;
/// Top of the first lane band
const FIRST_LANE_Y: i32 = 100;
/// Start and end events sit above the lane bands
const EVENT_Y: i32 = 50;
/// X position of the start event
const START_X: i32 = 100;
/// Branch-only tasks sit this far below their gateway's lane band
const BRANCH_OFFSET_Y: i32 = 80;

/// Display name of the start event. Takes part in branch-target resolution,
/// as does [`END_NAME`], so a decision can route straight to either event.
pub const START_NAME: &str = "Início";
/// Display name of the end event
pub const END_NAME: &str = "Fim";

/// Supported BPMN element types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    StartEvent,
    EndEvent,
    Task,
    ExclusiveGateway,
}

/// A flow node has a unique ID, a name, a type, and a layout position.
/// The same ID ties the node to its lane reference and its diagram shape.
#[derive(Debug, Clone)]
pub struct FlowNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub x: i32,
    pub y: i32,
}

/// A lane groups the flow nodes belonging to one executor
#[derive(Debug, Clone)]
pub struct Lane {
    pub id: String,
    pub name: String,
    pub node_refs: Vec<String>,
}

/// A sequence flow connects a source element to a target element.
/// Flows leaving a gateway carry the branch condition as their inscription.
#[derive(Debug, Clone)]
pub struct SequenceFlow {
    pub source_id: String,
    pub target_id: String,
    pub condition: String,
}

/// Produces the element IDs for one conversion. Injected into the graph builder
/// so tests can swap the random source for a counter and get stable output.
pub trait IdGen {
    /// Produce an identifier that is unique within one conversion
    fn fresh(&mut self) -> String;
}

/// IDs in the style `id_3f2a9c41`: one short random token per element
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGen;

impl IdGen for RandomIdGen {
    fn fresh(&mut self) -> String {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        format!("id_{}", &hex[..8])
    }
}

/// Counter-based IDs (`id_0`, `id_1`, ...) for reproducible output
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialIdGen {
    next: usize,
}

impl IdGen for SequentialIdGen {
    fn fresh(&mut self) -> String {
        let id = format!("id_{}", self.next);
        self.next += 1;
        id
    }
}

/// A process graph consists of lanes, flow nodes, and the sequence flows
/// connecting them. Built fresh for each conversion and discarded after
/// serialization.
#[derive(Debug, Clone)]
pub struct ProcessGraph {
    pub lanes: Vec<Lane>,
    pub nodes: Vec<FlowNode>,
    pub flows: Vec<SequenceFlow>,
}

impl ProcessGraph {
    /// Build a laid-out process graph from an ordered step list.
    ///
    /// The default flows form a single chain from the start event through every
    /// step in input order to the end event. Gateway branches are resolved in a
    /// second pass; targets that do not name an existing element are created as
    /// tasks in the gateway's own lane.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSteps`] for an empty step list and
    /// [`Error::DuplicateStep`] when two steps share a name or a step claims one
    /// of the event names.
    pub fn from_steps(steps: &[StepRecord], ids: &mut dyn IdGen) -> Result<Self, Error> {
        if steps.is_empty() {
            return Err(Error::NoSteps);
        }

        // Lanes in first-seen executor order, one band per lane
        let mut lanes: Vec<Lane> = Vec::new();
        for step in steps {
            if !lanes.iter().any(|lane| lane.name == step.executor) {
                lanes.push(Lane {
                    id: format!("Lane_{}", lanes.len()),
                    name: step.executor.clone(),
                    node_refs: Vec::new(),
                });
            }
        }
        let lane_y = |band: usize| band as i32 * SPACING_Y + FIRST_LANE_Y;

        let mut nodes: Vec<FlowNode> = Vec::new();
        let mut flows: Vec<SequenceFlow> = Vec::new();
        // Resolves names to node indices; the event names are registered too
        let mut index: HashMap<String, usize, ahash::RandomState> = HashMap::default();

        let mut x = START_X;
        let start_id = ids.fresh();
        nodes.push(FlowNode {
            id: start_id.clone(),
            name: START_NAME.to_owned(),
            kind: NodeKind::StartEvent,
            x,
            y: EVENT_Y,
        });
        index.insert(START_NAME.to_owned(), 0);
        x += SPACING_X;
        let mut previous = start_id;

        for step in steps {
            // END_NAME is only registered after the walk, so reserve it here
            if step.name == END_NAME || index.contains_key(&step.name) {
                return Err(Error::DuplicateStep(step.name.clone()));
            }
            let lane_idx = lanes
                .iter()
                .position(|lane| lane.name == step.executor)
                .expect("lane exists for every executor");
            let id = ids.fresh();
            let kind = match step.kind {
                StepKind::Task => NodeKind::Task,
                StepKind::Gateway => NodeKind::ExclusiveGateway,
            };
            nodes.push(FlowNode {
                id: id.clone(),
                name: step.name.clone(),
                kind,
                x,
                y: lane_y(lane_idx),
            });
            index.insert(step.name.clone(), nodes.len() - 1);
            lanes[lane_idx].node_refs.push(id.clone());
            flows.push(SequenceFlow {
                source_id: previous,
                target_id: id.clone(),
                condition: String::new(),
            });
            previous = id;
            x += SPACING_X;
        }

        let end_id = ids.fresh();
        nodes.push(FlowNode {
            id: end_id.clone(),
            name: END_NAME.to_owned(),
            kind: NodeKind::EndEvent,
            x,
            y: EVENT_Y,
        });
        index.insert(END_NAME.to_owned(), nodes.len() - 1);
        flows.push(SequenceFlow {
            source_id: previous,
            target_id: end_id,
            condition: String::new(),
        });

        // Second pass, gateways only: resolve branch targets and create the
        // conditioned flows. Unknown targets become tasks in the gateway's lane,
        // laid out to the right of the gateway and below its band.
        for step in steps {
            if step.kind != StepKind::Gateway {
                continue;
            }
            // The .expect() calls are safe because the first pass registered
            // every step and every executor
            let &gateway_idx = index
                .get(&step.name)
                .expect("gateway registered in first pass");
            let (gateway_id, gateway_x) = {
                let node = &nodes[gateway_idx];
                (node.id.clone(), node.x)
            };
            let lane_idx = lanes
                .iter()
                .position(|lane| lane.name == step.executor)
                .expect("lane exists for every executor");

            let mut branch_x = gateway_x;
            for branch in &step.branches {
                let target_id = match index.get(&branch.target) {
                    Some(&idx) => nodes[idx].id.clone(),
                    None => {
                        branch_x += SPACING_X;
                        let id = ids.fresh();
                        nodes.push(FlowNode {
                            id: id.clone(),
                            name: branch.target.clone(),
                            kind: NodeKind::Task,
                            x: branch_x,
                            y: lane_y(lane_idx) + BRANCH_OFFSET_Y,
                        });
                        index.insert(branch.target.clone(), nodes.len() - 1);
                        lanes[lane_idx].node_refs.push(id.clone());
                        id
                    }
                };
                flows.push(SequenceFlow {
                    source_id: gateway_id.clone(),
                    target_id,
                    condition: branch.condition.clone(),
                });
            }
        }

        tracing::debug!(
            lanes = lanes.len(),
            nodes = nodes.len(),
            flows = flows.len(),
            "assembled process graph"
        );
        Ok(ProcessGraph { lanes, nodes, flows })
    }

    /// Look up a node by its generated ID
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::steps::parse_steps;

    fn graph(input: &str) -> ProcessGraph {
        let steps = parse_steps(input).unwrap();
        ProcessGraph::from_steps(&steps, &mut SequentialIdGen::default()).unwrap()
    }

    #[test]
    fn linear_flow_forms_single_chain() {
        let graph = graph("PASSO: Receber pedido | EXECUTOR: Vendas\nPASSO: Enviar pedido | EXECUTOR: Logística\n");
        assert_eq!(graph.lanes.len(), 2);
        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(graph.flows.len(), 3);
        assert!(graph.flows.iter().all(|flow| flow.condition.is_empty()));

        assert_eq!(graph.nodes[0].kind, NodeKind::StartEvent);
        assert_eq!(graph.nodes[3].kind, NodeKind::EndEvent);
        assert_eq!(graph.flows[0].source_id, graph.nodes[0].id);
        for pair in graph.flows.windows(2) {
            assert_eq!(pair[0].target_id, pair[1].source_id);
        }
        assert_eq!(graph.flows[2].target_id, graph.nodes[3].id);
    }

    #[test]
    fn lanes_preserve_first_seen_order() {
        let graph = graph("PASSO: Um | EXECUTOR: Logística\nPASSO: Dois | EXECUTOR: Vendas\nPASSO: Três | EXECUTOR: Logística\n");
        assert_eq!(graph.lanes.len(), 2);
        assert_eq!(graph.lanes[0].id, "Lane_0");
        assert_eq!(graph.lanes[0].name, "Logística");
        assert_eq!(graph.lanes[1].id, "Lane_1");
        assert_eq!(graph.lanes[1].name, "Vendas");
    }

    #[test]
    fn positions_advance_on_a_fixed_grid() {
        let graph = graph("PASSO: Receber pedido | EXECUTOR: Vendas\nPASSO: Enviar pedido | EXECUTOR: Logística\n");
        let positions: Vec<(i32, i32)> = graph.nodes.iter().map(|node| (node.x, node.y)).collect();
        // start and end above the bands, steps on their lane bands
        assert_eq!(positions, [(100, 50), (300, 100), (500, 250), (700, 50)]);
    }

    #[test]
    fn every_task_and_gateway_is_in_exactly_one_lane() {
        let graph = graph("PASSO: Um | EXECUTOR: A\nDECISAO: Dois? | EXECUTOR: B | Sim -> Quatro | Não -> Fim\nPASSO: Três | EXECUTOR: A\n");
        let refs: Vec<&String> = graph.lanes.iter().flat_map(|lane| &lane.node_refs).collect();
        let owned: Vec<&FlowNode> = graph
            .nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Task | NodeKind::ExclusiveGateway))
            .collect();
        assert_eq!(refs.len(), owned.len());
        for node in owned {
            assert_eq!(refs.iter().filter(|r| ***r == node.id).count(), 1);
        }
    }

    #[test]
    fn gateway_materializes_missing_branch_targets() {
        let graph = graph("DECISAO: Aprovar? | EXECUTOR: Gerente | Sim -> Enviar | Não -> Cancelar");
        // start, gateway, end, plus the two created tasks
        assert_eq!(graph.nodes.len(), 5);
        assert_eq!(graph.lanes.len(), 1);
        assert_eq!(graph.lanes[0].node_refs.len(), 3);

        let conditioned: Vec<&SequenceFlow> = graph
            .flows
            .iter()
            .filter(|flow| !flow.condition.is_empty())
            .collect();
        assert_eq!(conditioned.len(), 2);
        assert_eq!(conditioned[0].condition, "Sim");
        assert_eq!(graph.node(&conditioned[0].target_id).unwrap().name, "Enviar");
        assert_eq!(conditioned[1].condition, "Não");
        assert_eq!(graph.node(&conditioned[1].target_id).unwrap().name, "Cancelar");

        let enviar = graph.node(&conditioned[0].target_id).unwrap();
        assert_eq!(enviar.kind, NodeKind::Task);
        // right of the gateway at (300, 100), below its band
        assert_eq!((enviar.x, enviar.y), (500, 180));
        let cancelar = graph.node(&conditioned[1].target_id).unwrap();
        assert_eq!((cancelar.x, cancelar.y), (700, 180));
    }

    #[test]
    fn branch_target_resolves_to_existing_step() {
        let graph = graph("DECISAO: Aprovar? | EXECUTOR: Gerente | Sim -> Enviar pedido\nPASSO: Enviar pedido | EXECUTOR: Logística\n");
        // no extra node is created for the branch
        assert_eq!(graph.nodes.len(), 4);
        let conditioned = graph.flows.iter().find(|flow| !flow.condition.is_empty()).unwrap();
        let target = graph.node(&conditioned.target_id).unwrap();
        assert_eq!(target.name, "Enviar pedido");
        assert_eq!(target.kind, NodeKind::Task);
    }

    #[test]
    fn branch_target_fim_routes_to_end_event() {
        let graph = graph("DECISAO: Aprovar? | EXECUTOR: Gerente | Não -> Fim");
        assert_eq!(graph.nodes.len(), 3);
        let conditioned = graph.flows.iter().find(|flow| !flow.condition.is_empty()).unwrap();
        assert_eq!(graph.node(&conditioned.target_id).unwrap().kind, NodeKind::EndEvent);
    }

    #[test]
    fn duplicate_step_names_are_rejected() {
        let steps = parse_steps("PASSO: Receber | EXECUTOR: A\nPASSO: Receber | EXECUTOR: B\n").unwrap();
        let err = ProcessGraph::from_steps(&steps, &mut SequentialIdGen::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateStep(name) if name == "Receber"));
    }

    #[test]
    fn event_names_are_reserved() {
        for name in [START_NAME, END_NAME] {
            let steps = parse_steps(&format!("PASSO: {} | EXECUTOR: A", name)).unwrap();
            let err = ProcessGraph::from_steps(&steps, &mut SequentialIdGen::default()).unwrap_err();
            assert!(matches!(err, Error::DuplicateStep(n) if n == name));
        }
    }

    #[test]
    fn empty_step_list_is_rejected() {
        let err = ProcessGraph::from_steps(&[], &mut SequentialIdGen::default()).unwrap_err();
        assert!(matches!(err, Error::NoSteps));
    }

    #[test]
    fn sequential_ids_give_deterministic_graphs() {
        let input = "PASSO: Um | EXECUTOR: A\nDECISAO: Dois? | EXECUTOR: B | Sim -> Três\n";
        let first = graph(input);
        let second = graph(input);
        assert_eq!(format!("{:?}", first), format!("{:?}", second));
    }
}
