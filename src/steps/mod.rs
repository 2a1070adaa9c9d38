//! This module defines the data structures for process steps and provides a parser
//! for the line-oriented flow description format.

mod parse;

pub use parse::parse_steps;

/// Supported step types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Task,
    Gateway,
}

/// An outgoing branch of a decision
#[derive(Debug, Clone)]
pub struct Branch {
    /// The condition guarding the branch, carried verbatim onto the generated flow
    pub condition: String,
    /// The name of the step the branch leads to.
    /// May name a step that does not exist yet; such targets are created on demand.
    pub target: String,
}

/// A step has a name, an executor (the lane it belongs to), a type,
/// and for decisions a list of outgoing branches
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub name: String,
    pub executor: String,
    pub kind: StepKind,
    pub branches: Vec<Branch>,
}
