use crate::record::Record;
use thiserror::Error;

/// Added to a quality character's distance from `'0'` to get its PHRED score. This matches
/// the `'!' == Q0` encoding written by the basecaller, and must not be swapped for a lookup
/// table: downstream analyses depend on the exact arithmetic.
pub const SCORE_OFFSET: f64 = 15.0;

/// The per-read values reported for every record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Number of bases in the sequence
    pub len: usize,
    /// Mean PHRED quality, averaged in the error-probability domain
    pub avg_qual: f64,
}

#[derive(Error, Debug, PartialEq)]
pub enum QualityError {
    #[error("quality string is empty, so no average quality can be computed")]
    Empty,
}

/// Decodes one quality character into its PHRED score.
pub fn phred_score(c: char) -> f64 {
    (c as u32 as f64 - '0' as u32 as f64) + SCORE_OFFSET
}

/// Converts a PHRED score into the probability that the base call is wrong.
pub fn error_probability(score: f64) -> f64 {
    10f64.powf(-score / 10.0)
}

/// Converts an error probability back onto the PHRED scale.
pub fn probability_to_phred(probability: f64) -> f64 {
    -10.0 * probability.log10()
}

/// Computes the average PHRED quality of a quality string.
///
/// Scores are converted to error probabilities, averaged, and the average converted back;
/// this is how Nanopore tooling (e.g. NanoPlot) reports read quality, and differs from
/// taking the arithmetic mean of the scores themselves.
///
/// Returns `None` for an empty quality string.
pub fn phred_quality_avg(qual: &str) -> Option<f64> {
    let (total, count) = qual
        .chars()
        .map(|c| error_probability(phred_score(c)))
        .fold((0f64, 0usize), |(total, count), p| (total + p, count + 1));

    if count == 0 {
        return None;
    }

    Some(probability_to_phred(total / count as f64))
}

impl TryFrom<&Record> for Metrics {
    type Error = QualityError;

    fn try_from(rec: &Record) -> Result<Self, Self::Error> {
        let avg_qual = phred_quality_avg(&rec.qual).ok_or(QualityError::Empty)?;

        Ok(Metrics {
            len: rec.len(),
            avg_qual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn decode_characters() {
        assert_eq!(phred_score('0'), 15.0);
        assert_eq!(phred_score('6'), 21.0);
        assert_eq!(phred_score('!'), 0.0);
        assert_eq!(phred_score('I'), 40.0);
    }

    #[test]
    fn probability_of_q20() {
        assert!(close(error_probability(20.0), 0.01));
        assert!(close(probability_to_phred(0.001), 30.0));
    }

    #[test]
    fn constant_quality_round_trips() {
        for c in ['!', '+', '5', '6', '?', 'I'] {
            let qual: String = std::iter::repeat(c).take(37).collect();
            let avg = phred_quality_avg(&qual).unwrap();
            assert!(close(avg, phred_score(c)), "{c}: {avg}");
        }
    }

    #[test]
    fn averages_in_probability_space() {
        // Q20 and Q30 -> mean probability 0.0055, not a naive mean of 25
        let avg = phred_quality_avg("5?").unwrap();
        assert!(close(avg, probability_to_phred(0.0055)));
        assert!(avg < 25.0);
    }

    #[test]
    fn empty_quality() {
        assert_eq!(phred_quality_avg(""), None);

        let rec = Record {
            id: "@empty".to_string(),
            ..Record::default()
        };
        assert_eq!(Metrics::try_from(&rec), Err(QualityError::Empty));
    }

    #[test]
    fn metrics_from_record() {
        let rec = Record {
            id: "@read1".to_string(),
            seq: "ACGT".to_string(),
            qual: "6666".to_string(),
        };
        let m = Metrics::try_from(&rec).unwrap();
        assert_eq!(m.len, 4);
        assert!(close(m.avg_qual, 21.0));
    }
}
