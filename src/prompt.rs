use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::config::Labels;
use crate::error::InvalidSelection;

/// Blank input picks the first port.
pub fn parse_selection(line: &str, count: usize) -> Result<usize, InvalidSelection> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(0);
    }
    let choice: usize = line
        .parse()
        .map_err(|_| InvalidSelection::NotANumber(line.to_owned()))?;
    if choice >= count {
        return Err(InvalidSelection::OutOfRange { choice, count });
    }
    Ok(choice)
}

/// Lists `ports` and asks until a usable index is entered. End of input
/// counts as the default choice.
pub fn select_port<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    ports: &[String],
    labels: &Labels,
) -> io::Result<usize> {
    writeln!(output, "{}", labels.available_ports)?;
    for (index, name) in ports.iter().enumerate() {
        writeln!(output, "  {index}: {name}")?;
    }
    loop {
        write!(output, "{}", labels.select_port)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(0);
        }
        match parse_selection(&line, ports.len()) {
            Ok(index) => return Ok(index),
            Err(e) => {
                tracing::debug!("Rejected port choice: {}", e);
                writeln!(output, "{} ({})", labels.invalid_choice, e)?;
            }
        }
    }
}

pub fn prompt_path<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    labels: &Labels,
) -> io::Result<PathBuf> {
    write!(output, "{}", labels.enter_path)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}
