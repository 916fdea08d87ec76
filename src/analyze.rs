use crate::config::Config;
use crate::filter::{filter, FilterOpts};
use crate::io::{until_err, Sinks};
use crate::quality::Metrics;
use crate::reader::{self, FastqReader};
use anyhow::{Context, Result};
use std::io::BufRead;

/// Counts describing a finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Complete records read from the input
    pub processed: usize,
    /// Records written to the outputs
    pub passed: usize,
    /// Records rejected by the length or quality bounds
    pub filtered: usize,
    /// Lines after the last complete record, which were ignored
    pub trailing_lines: usize,
}

impl RunSummary {
    pub fn log(&self) {
        info!(
            "Stats: {} sequence entries, {} included, {} filtered",
            self.processed, self.passed, self.filtered
        );
        if self.trailing_lines > 0 {
            info!(
                "Ignored {} line(s) at the end of the file which do not form a complete record",
                self.trailing_lines
            );
        }
    }
}

/// Analyses every read of the input file, writing the reads which pass the filter to the
/// configured outputs.
///
/// The outputs are opened before the first read is processed and are always flushed before
/// returning, including when a malformed record stops the run part way through. Anything
/// already written is left in place in that case.
///
/// # Errors
///
/// * the input or an output file cannot be opened
/// * a record is malformed, or has an empty quality string
/// * writing to an output fails
pub fn run(config: &Config) -> Result<RunSummary> {
    let reader = reader::open(&config.input)?;
    let mut sinks = Sinks::open(config)?;

    let result = process(reader, &mut sinks, &config.filter);

    // flush regardless of whether processing completed
    let flushed = sinks.finish();
    let summary = result?;
    flushed?;

    Ok(summary)
}

fn process<R: BufRead>(
    mut reader: FastqReader<R>,
    sinks: &mut Sinks,
    opts: &FilterOpts,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    // Start with a placeholder error object. This will be mutated if there are errors during
    // iteration through the reads.
    let mut err = Ok(());

    reader
        .by_ref()
        .map(|rec| rec.map_err(anyhow::Error::from))
        .scan(&mut err, until_err)
        .try_for_each(|rec| -> Result<()> {
            summary.processed += 1;

            if summary.processed % 50000 == 0 {
                info!("Processed: {}", summary.processed);
            }

            let metrics = Metrics::try_from(&rec).with_context(|| {
                format!("record {} ({}) has no quality scores", summary.processed, rec.id)
            })?;

            if filter(&metrics, opts) {
                sinks.emit(&rec, &metrics)?;
                summary.passed += 1;
            } else {
                summary.filtered += 1;
            }

            Ok(())
        })?;

    err?;

    summary.trailing_lines = reader.trailing_lines();
    Ok(summary)
}
