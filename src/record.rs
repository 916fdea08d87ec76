/// A single four-line FASTQ record, with the surrounding whitespace of each line removed.
///
/// The identifier keeps its leading `@` exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub id: String,
    pub seq: String,
    pub qual: String,
}

impl Record {
    /// The number of bases in the sequence line.
    pub fn len(&self) -> usize {
        self.seq.chars().count()
    }
}
