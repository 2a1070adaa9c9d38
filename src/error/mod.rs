//! This module defines the error type for this program.

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

pub enum Error {
    NoInputFile, // Error when no input file is provided
    IO(std::io::Error), // Error when an IO operation fails
    MalformedLine { line: usize, content: String }, // Error when a marked line is missing its fields
    DuplicateStep(String), // Error when two distinct steps claim the same name
    NoSteps, // Error when the input contains no recognizable steps
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Error::NoInputFile => write!(f, "No input file provided. Exiting..."),
            Error::IO(e) => write!(f, "Error opening file: {}", e),
            Error::MalformedLine { line, content } => write!(
                f,
                "Malformed line {}: \"{}\". Expected \"PASSO: <nome> | EXECUTOR: <executor>\" or \"DECISAO: <nome> | EXECUTOR: <executor> | <condicao> -> <destino> | ...\"",
                line, content
            ),
            Error::DuplicateStep(name) => write!(f, "Duplicate step name: \"{}\". Every step and branch target must resolve to a single element", name),
            Error::NoSteps => write!(f, "No steps found. Lines must start with \"PASSO:\" or \"DECISAO:\""),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for Error {}
