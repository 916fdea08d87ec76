use crate::record::Record;
use std::io::{self, BufRead};
use thiserror::Error;

/// The only accepted content of the third line of a record.
pub const SEPARATOR: &str = "+";

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("record {record}: third line should be `+`, got `{found}`")]
    BadSeparator { record: usize, found: String },
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("could not read from the input file")]
    Io(#[from] io::Error),

    #[error("input file corrupt or not fastq format")]
    Format(#[from] FormatError),
}

/// Streams four-line FASTQ records out of any buffered reader.
///
/// Every line is trimmed of surrounding whitespace. Multi-line (wrapped) records are not
/// supported: each record is exactly identifier, sequence, separator and quality.
///
/// Iteration ends at end of input. If the input ends part way through a record, the leftover
/// lines are ignored and their count is kept in [`FastqReader::trailing_lines`].
pub struct FastqReader<R: BufRead> {
    rdr: R,
    buf: String,
    records: usize,
    trailing_lines: usize,
    eof: bool,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::with_capacity(256),
            records: 0,
            trailing_lines: 0,
            eof: false,
        }
    }

    /// Number of lines left over after the last complete record. Only meaningful once
    /// iteration has finished.
    pub fn trailing_lines(&self) -> usize {
        self.trailing_lines
    }

    /// Reads one line, trimmed. Returns `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        match self.rdr.read_line(&mut self.buf)? {
            0 => Ok(None),
            _ => Ok(Some(self.buf.trim().to_string())),
        }
    }

    fn read_record(&mut self) -> Result<Option<Record>, ReadError> {
        let mut lines: Vec<String> = Vec::with_capacity(4);

        while lines.len() < 4 {
            match self.read_line()? {
                Some(line) => lines.push(line),
                None => {
                    self.eof = true;
                    self.trailing_lines = lines.len();
                    return Ok(None);
                }
            }
        }

        let qual = lines.pop().unwrap_or_default();
        let separator = lines.pop().unwrap_or_default();
        let seq = lines.pop().unwrap_or_default();
        let id = lines.pop().unwrap_or_default();

        let record = self.records + 1;

        if separator != SEPARATOR {
            return Err(FormatError::BadSeparator {
                record,
                found: separator,
            }
            .into());
        }

        let (seq_len, qual_len) = (seq.chars().count(), qual.chars().count());
        if seq_len != qual_len {
            warn!("record {record} ({id}): {seq_len} bases but {qual_len} quality characters");
        }

        self.records = record;
        Ok(Some(Record { id, seq, qual }))
    }
}

impl<R: BufRead> Iterator for FastqReader<R> {
    type Item = Result<Record, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof {
            return None;
        }

        match self.read_record() {
            Ok(Some(rec)) => Some(Ok(rec)),
            Ok(None) => None,
            Err(e) => {
                // a malformed record ends the stream
                self.eof = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Cursor;

    fn reader(s: &str) -> FastqReader<Cursor<&[u8]>> {
        FastqReader::new(Cursor::new(s.as_bytes()))
    }

    #[test]
    fn reads_records_in_order() {
        let mut rdr = reader(indoc! {"
            @read1
            ACGT
            +
            6666
            @read2 runid=abc
            GGA
            +
            !!I
        "});

        let first = rdr.next().unwrap().unwrap();
        assert_eq!(first.id, "@read1");
        assert_eq!(first.seq, "ACGT");
        assert_eq!(first.qual, "6666");

        let second = rdr.next().unwrap().unwrap();
        assert_eq!(second.id, "@read2 runid=abc");
        assert_eq!(second.len(), 3);

        assert!(rdr.next().is_none());
        assert_eq!(rdr.trailing_lines(), 0);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let mut rdr = reader("  @r1 \r\nACG\r\n + \r\n555\r\n");
        let rec = rdr.next().unwrap().unwrap();
        assert_eq!(rec.id, "@r1");
        assert_eq!(rec.seq, "ACG");
        assert_eq!(rec.qual, "555");
    }

    #[test]
    fn last_line_without_newline() {
        let mut rdr = reader("@r1\nACG\n+\n555");
        assert_eq!(rdr.next().unwrap().unwrap().qual, "555");
        assert!(rdr.next().is_none());
    }

    #[test]
    fn bad_separator_is_fatal() {
        let mut rdr = reader(indoc! {"
            @read1
            ACGT
            +
            6666
            @read2
            ACGT
            -
            6666
            @read3
            ACGT
            +
            6666
        "});

        assert!(rdr.next().unwrap().is_ok());
        match rdr.next() {
            Some(Err(ReadError::Format(FormatError::BadSeparator { record, found }))) => {
                assert_eq!(record, 2);
                assert_eq!(found, "-");
            }
            other => panic!("expected a separator error, got {other:?}"),
        }
        assert!(rdr.next().is_none());
    }

    #[test]
    fn separator_with_repeated_id_is_rejected() {
        let mut rdr = reader("@r1\nACG\n+r1\n555\n");
        assert!(matches!(rdr.next(), Some(Err(ReadError::Format(_)))));
    }

    #[test]
    fn partial_trailing_group_is_skipped() {
        let mut rdr = reader("@r1\nACG\n+\n555\n@r2\nACG\n");
        assert!(rdr.next().unwrap().is_ok());
        assert!(rdr.next().is_none());
        assert_eq!(rdr.trailing_lines(), 2);
    }

    #[test]
    fn empty_input() {
        let mut rdr = reader("");
        assert!(rdr.next().is_none());
        assert_eq!(rdr.trailing_lines(), 0);
    }
}
