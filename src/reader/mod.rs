pub mod fastq;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub use fastq::FastqReader;

/// Opens a FASTQ file on disk for streaming.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn open(path: &str) -> Result<FastqReader<BufReader<File>>> {
    let file = File::open(Path::new(path)).with_context(|| format!("Unable to open file {path}"))?;
    Ok(FastqReader::new(BufReader::new(file)))
}
