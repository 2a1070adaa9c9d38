pub mod error;
pub mod steps;
pub mod bpmn;

pub use error::*;
pub use crate::steps::{parse_steps, Branch, StepKind, StepRecord};
pub use crate::bpmn::{
    Definitions, FlowNode, IdGen, Lane, NodeKind, ProcessGraph, RandomIdGen, SequenceFlow,
    SequentialIdGen,
};

/// Convert a flow description into a BPMN 2.0 XML document.
///
/// # Errors
///
/// Fails on malformed marked lines, duplicate step names, or input without any
/// recognizable steps. Either a complete document is produced or nothing is.
pub fn convert(text: &str) -> Result<String, Error> {
    let steps = parse_steps(text)?;
    let graph = ProcessGraph::from_steps(&steps, &mut RandomIdGen)?;
    Ok(Definitions::from(&graph).to_string())
}
