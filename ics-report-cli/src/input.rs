//! Reading calendar files and prompting for missing arguments

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Read a calendar file into memory in full
pub fn read_calendar(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read calendar file: {:?}", path))?;
    log::debug!("Read {} bytes from {:?}", content.len(), path);
    Ok(content)
}

/// Ask for one line on stdin
pub fn prompt(label: &str) -> Result<String> {
    let stdin = io::stdin();
    prompt_from(&mut stdin.lock(), &mut io::stdout(), label)
}

/// Write `label`, then read and trim one line from `input`
pub fn prompt_from<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{}", label)?;
    output.flush()?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if read == 0 {
        bail!("No input provided for prompt {:?}", label.trim());
    }

    Ok(line.trim().to_string())
}
