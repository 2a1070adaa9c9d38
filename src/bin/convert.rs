use std::fs;

use fluxo_bpmn::{convert, Error};

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    // Read the input file from the command line arguments
    let input_file = std::env::args().nth(1).ok_or(Error::NoInputFile)?;

    // Parse the flow description and convert it to a BPMN diagram
    let text = fs::read_to_string(&input_file).map_err(Error::IO)?;
    let xml = convert(&text)?;

    // Print the BPMN XML; redirect to a .bpmn file to import it elsewhere
    println!("{}", xml);

    Ok(())
}
