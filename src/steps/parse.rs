//! This module is responsible for parsing a flow description into an ordered list
//! of step records.
//!
//! Two line shapes are recognized:
//!
//! - `PASSO: <nome> | EXECUTOR: <executor>`
//! - `DECISAO: <nome> | EXECUTOR: <executor> | <condicao> -> <destino> | ...`
//!
//! Every other line is skipped. Fields are positional: the first `|`-segment holds
//! the marker and the step name, the second the executor, and for decisions each
//! remaining segment containing `->` is a branch. There is no escaping for a
//! literal `|` or `->` inside a name or condition.

use crate::error::Error;

use super::{Branch, StepKind, StepRecord};

const TASK_MARKER: &str = "PASSO:";
const GATEWAY_MARKER: &str = "DECISAO:";
const EXECUTOR_MARKER: &str = "EXECUTOR:";
const BRANCH_ARROW: &str = "->";

/// Parse a flow description into step records, preserving input line order.
///
/// # Errors
///
/// Returns [`Error::MalformedLine`] if a marked line is missing the executor
/// segment or has an empty name or executor.
pub fn parse_steps(input: &str) -> Result<Vec<StepRecord>, Error> {
    let mut steps = Vec::new();
    for (number, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.starts_with(TASK_MARKER) {
            let (name, executor, _) = split_fields(line, TASK_MARKER, number)?;
            steps.push(StepRecord {
                name,
                executor,
                kind: StepKind::Task,
                branches: Vec::new(),
            });
        } else if line.starts_with(GATEWAY_MARKER) {
            let (name, executor, rest) = split_fields(line, GATEWAY_MARKER, number)?;
            let branches = rest
                .filter_map(|segment| segment.split_once(BRANCH_ARROW))
                .map(|(condition, target)| Branch {
                    condition: condition.trim().to_owned(),
                    target: target.trim().to_owned(),
                })
                .collect();
            steps.push(StepRecord {
                name,
                executor,
                kind: StepKind::Gateway,
                branches,
            });
        }
    }
    tracing::debug!(steps = steps.len(), "parsed flow description");
    Ok(steps)
}

/// Split a marked line into its name, its executor, and the remaining `|`-segments.
fn split_fields<'a>(
    line: &'a str,
    marker: &str,
    number: usize,
) -> Result<(String, String, std::str::Split<'a, char>), Error> {
    let malformed = || Error::MalformedLine {
        line: number + 1,
        content: line.to_owned(),
    };

    let mut segments = line.split('|');
    let name = segments
        .next()
        .and_then(|segment| segment.strip_prefix(marker))
        .map(str::trim)
        .ok_or_else(malformed)?;
    let executor = segments
        .next()
        .map(str::trim)
        .map(|segment| segment.strip_prefix(EXECUTOR_MARKER).unwrap_or(segment).trim())
        .ok_or_else(malformed)?;
    if name.is_empty() || executor.is_empty() {
        return Err(malformed());
    }
    Ok((name.to_owned(), executor.to_owned(), segments))
}
