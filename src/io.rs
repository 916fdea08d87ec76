use crate::config::{AnalysisOutput, Config};
use crate::quality::Metrics;
use crate::record::Record;
use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::io::{stdout, BufWriter, Write};
use std::path::Path;

/// Appended to the sequence ID of every read in the annotated .fastq output, as
/// `-gmNano-LQ-D<length>-Q<quality>-`.
pub const TAG_PREFIX: &str = "-gmNano-LQ-";

/// Opens a file for appending, creating it if it does not exist. Repeated runs with the same
/// output path therefore accumulate results.
pub fn open_append(path: &str) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(Path::new(path))
        .with_context(|| format!("Unable to open output file {path}"))
}

/// How the average quality is rendered in the analysis output.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum QualityFormat {
    /// Fixed 9 decimal places, used for files
    Fixed,
    /// Shortest representation that round-trips, always with a decimal point. Used for
    /// the terminal
    Shortest,
}

impl QualityFormat {
    pub fn render(self, quality: f64) -> String {
        match self {
            QualityFormat::Fixed => format!("{quality:.9}"),
            QualityFormat::Shortest => format!("{quality:?}"),
        }
    }
}

/// Writes one tab separated line per read: `[id\t]length\tquality`.
pub struct AnalysisWriter<W: Write> {
    wtr: csv::Writer<W>,
    format: QualityFormat,
    show_id: bool,
}

impl<W: Write> AnalysisWriter<W> {
    pub fn new(inner: W, format: QualityFormat, show_id: bool) -> Self {
        let wtr = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(inner);

        AnalysisWriter {
            wtr,
            format,
            show_id,
        }
    }

    pub fn write(&mut self, rec: &Record, metrics: &Metrics) -> csv::Result<()> {
        let len = metrics.len.to_string();
        let qual = self.format.render(metrics.avg_qual);

        if self.show_id {
            self.wtr.write_record([rec.id.as_str(), len.as_str(), qual.as_str()])
        } else {
            self.wtr.write_record([len.as_str(), qual.as_str()])
        }
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.wtr.flush()
    }
}

/// Builds the annotated sequence ID, e.g. `@read1-gmNano-LQ-D4-Q21.000000000-`.
pub fn annotate_id(id: &str, metrics: &Metrics) -> String {
    format!(
        "{id}{TAG_PREFIX}D{}-Q{:.9}-",
        metrics.len, metrics.avg_qual
    )
}

/// Formats a record with an annotated ID into a valid FASTQ read and writes it to the provided
/// writer. The ID is always written, as a .fastq read without one would not be valid.
///
/// Since this is `std::io::Write` and *not* `std::fmt::Write`, this does not accept Strings.
pub fn write_annotated(
    writer: &mut impl Write,
    rec: &Record,
    metrics: &Metrics,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{}\n{}\n+\n{}",
        annotate_id(&rec.id, metrics),
        rec.seq,
        rec.qual
    )
}

/// Every output of a run. Files are opened once, before any read is processed, and
/// [`Sinks::finish`] flushes all of them.
pub struct Sinks {
    analysis: AnalysisWriter<Box<dyn Write>>,
    /// Copy of the analysis on the terminal, when the analysis goes to a file in verbose mode
    echo: Option<AnalysisWriter<Box<dyn Write>>>,
    fastq: Option<BufWriter<File>>,
}

impl Sinks {
    /// Opens the outputs requested by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an output file cannot be opened for appending.
    pub fn open(config: &Config) -> Result<Self> {
        let terminal = || {
            AnalysisWriter::new(
                Box::new(stdout()) as Box<dyn Write>,
                QualityFormat::Shortest,
                config.show_id,
            )
        };

        let (analysis, echo) = match &config.analysis {
            AnalysisOutput::Terminal => (terminal(), None),
            AnalysisOutput::File(path) => {
                let file = Box::new(open_append(path)?) as Box<dyn Write>;
                let analysis = AnalysisWriter::new(file, QualityFormat::Fixed, config.show_id);
                (analysis, config.verbose.then(terminal))
            }
        };

        let fastq = match &config.output_fastq {
            Some(path) => Some(BufWriter::new(open_append(path)?)),
            None => None,
        };

        Ok(Sinks {
            analysis,
            echo,
            fastq,
        })
    }

    /// Writes a read that passed the filter to every output.
    pub fn emit(&mut self, rec: &Record, metrics: &Metrics) -> Result<()> {
        self.analysis.write(rec, metrics)?;

        if let Some(echo) = &mut self.echo {
            echo.write(rec, metrics)?;
        }

        if let Some(fastq) = &mut self.fastq {
            write_annotated(fastq, rec, metrics)?;
        }

        Ok(())
    }

    /// Flushes every output. All outputs are attempted even if one fails, and the first error
    /// is returned.
    pub fn finish(&mut self) -> Result<()> {
        let results = [
            self.analysis
                .flush()
                .context("Unable to write the analysis output"),
            self.echo
                .as_mut()
                .map_or(Ok(()), |echo| echo.flush())
                .context("Unable to write to the terminal"),
            self.fastq
                .as_mut()
                .map_or(Ok(()), |fastq| fastq.flush())
                .context("Unable to write the .fastq output"),
        ];

        results.into_iter().collect()
    }
}

/// Utility function to extract the error from an iterator and stop iteration immediately. Useful
/// for iterators which yield a Result<T>.
///
/// # Returns
///
/// This function returns an `Option<T>`. If the item is `Ok`, it returns `Some(T)`.
/// If the item is `Err`, it updates `err` with the error and returns `None`.
pub fn until_err<T>(err: &mut &mut anyhow::Result<()>, item: anyhow::Result<T>) -> Option<T> {
    match item {
        Ok(item) => Some(item),
        Err(e) => {
            **err = Err(e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn read1() -> (Record, Metrics) {
        (
            Record {
                id: "@read1".to_string(),
                seq: "ACGT".to_string(),
                qual: "6666".to_string(),
            },
            Metrics {
                len: 4,
                avg_qual: 21.0,
            },
        )
    }

    fn analysis(format: QualityFormat, show_id: bool) -> String {
        let (rec, m) = read1();
        let mut buf = Vec::new();
        {
            let mut wtr = AnalysisWriter::new(&mut buf, format, show_id);
            wtr.write(&rec, &m).unwrap();
            wtr.flush().unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn analysis_line_for_files() {
        assert_eq!(analysis(QualityFormat::Fixed, true), "@read1\t4\t21.000000000\n");
        assert_eq!(analysis(QualityFormat::Fixed, false), "4\t21.000000000\n");
    }

    #[test]
    fn analysis_line_for_terminal() {
        assert_eq!(analysis(QualityFormat::Shortest, true), "@read1\t4\t21.0\n");
        assert_eq!(analysis(QualityFormat::Shortest, false), "4\t21.0\n");
    }

    #[test]
    fn quality_rendering() {
        assert_eq!(QualityFormat::Fixed.render(17.1234567894), "17.123456789");
        assert_eq!(QualityFormat::Shortest.render(17.25), "17.25");
        assert_eq!(QualityFormat::Shortest.render(30.0), "30.0");
    }

    #[test]
    fn ids_are_never_quoted() {
        let rec = Record {
            id: "@read \"2\" ch=1".to_string(),
            ..Record::default()
        };
        let m = Metrics {
            len: 0,
            avg_qual: 5.5,
        };
        let mut buf = Vec::new();
        {
            let mut wtr = AnalysisWriter::new(&mut buf, QualityFormat::Fixed, true);
            wtr.write(&rec, &m).unwrap();
            wtr.flush().unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "@read \"2\" ch=1\t0\t5.500000000\n");
    }

    #[test]
    fn annotated_read() {
        let (rec, m) = read1();
        let mut buf = Vec::new();
        write_annotated(&mut buf, &rec, &m).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "@read1-gmNano-LQ-D4-Q21.000000000-\nACGT\n+\n6666\n"
        );
    }

    #[test]
    fn append_mode_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let path = path.to_str().unwrap();

        for line in ["first\n", "second\n"] {
            let mut f = open_append(path).unwrap();
            f.write_all(line.as_bytes()).unwrap();
        }

        assert_eq!(std::fs::read_to_string(path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn until_err_stops_at_first_error() {
        let mut err = Ok(());
        let items = vec![Ok(1), Ok(2), Err(anyhow!("error")), Ok(3)];
        let results: Vec<_> = items.into_iter().scan(&mut err, until_err).collect();
        assert_eq!(results, vec![1, 2]);
        assert!(err.is_err());
    }
}
