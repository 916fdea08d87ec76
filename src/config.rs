use crate::cli::Cli;
use crate::filter::FilterOpts;
use thiserror::Error;

/// Lowest and highest lengths accepted when no length bounds are given.
pub const DEFAULT_LEN: Interval<i64> = Interval {
    min: -1,
    max: 9_999_999_999_999,
};

/// Lowest and highest average qualities accepted when no quality bounds are given.
pub const DEFAULT_QUALITY: Interval<f64> = Interval {
    min: -1.0,
    max: 1000.0,
};

/// An inclusive interval `[min, max]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Interval<T> {
    pub fn contains(&self, v: T) -> bool {
        (self.min <= v) && (v <= self.max)
    }

    fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// Where the tab separated analysis is written.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisOutput {
    Terminal,
    File(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("gmNano-LQ requires a fastq file. None provided. try --input filename.fastq")]
    MissingInput,

    #[error("invalid value `{value}` for --{flag}: expected a number")]
    InvalidNumber { flag: &'static str, value: String },

    #[error(
        "gmNano-LQ requires a minimum DNA sequence length ({min}) to be shorter or equal to \
         the maximum DNA sequence length ({max})"
    )]
    LengthBounds { min: i64, max: i64 },

    #[error(
        "gmNano-LQ requires a minimum average Phred quality score ({min}) to be less than or \
         equal to the maximum Phred quality score ({max})"
    )]
    QualityBounds { min: f64, max: f64 },
}

/// The fully resolved settings for a run. Built once, before any file is touched.
#[derive(Clone, Debug)]
pub struct Config {
    pub input: String,
    pub analysis: AnalysisOutput,
    pub output_fastq: Option<String>,
    pub filter: FilterOpts,
    /// Whether the analysis output carries the sequence ID. The annotated .fastq always does.
    pub show_id: bool,
    pub verbose: bool,
}

fn parse_number(flag: &'static str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidNumber {
            flag,
            value: value.to_string(),
        })
}

/// Lengths are given as any number and rounded down.
fn parse_length(flag: &'static str, value: &str) -> Result<i64, ConfigError> {
    let v = parse_number(flag, value)?;
    if !v.is_finite() {
        return Err(ConfigError::InvalidNumber {
            flag,
            value: value.to_string(),
        });
    }
    Ok(v.floor() as i64)
}

impl Config {
    /// Validates and normalises the command line into a `Config`.
    ///
    /// # Errors
    ///
    /// * no input file was given
    /// * a bound is not a number
    /// * a minimum bound is greater than its maximum, checked separately for length and quality
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let input = cli.input.clone().ok_or(ConfigError::MissingInput)?;

        let len = Interval {
            min: match &cli.dna_min {
                Some(v) => parse_length("DNAmin", v)?,
                None => DEFAULT_LEN.min,
            },
            max: match &cli.dna_max {
                Some(v) => parse_length("DNAmax", v)?,
                None => DEFAULT_LEN.max,
            },
        };
        if !len.is_ordered() {
            return Err(ConfigError::LengthBounds {
                min: len.min,
                max: len.max,
            });
        }

        let quality = Interval {
            min: match &cli.quality_min {
                Some(v) => parse_number("Qualitymin", v)?,
                None => DEFAULT_QUALITY.min,
            },
            max: match &cli.quality_max {
                Some(v) => parse_number("Qualitymax", v)?,
                None => DEFAULT_QUALITY.max,
            },
        };
        // written this way round so that NaN bounds are accepted, and then match nothing
        if quality.max < quality.min {
            return Err(ConfigError::QualityBounds {
                min: quality.min,
                max: quality.max,
            });
        }

        let analysis = match &cli.output {
            Some(path) => AnalysisOutput::File(path.clone()),
            None => AnalysisOutput::Terminal,
        };

        Ok(Config {
            input,
            analysis,
            output_fastq: cli.output_fastq.clone(),
            filter: FilterOpts { len, quality },
            show_id: !cli.suppress_sequence_id,
            verbose: cli.verbose,
        })
    }

    /// Reports every resolved setting at `info` level.
    pub fn log(&self) {
        info!("gmNano-LQ v{} processing {}", crate::cli::VERSION, self.input);

        match &self.analysis {
            AnalysisOutput::File(path) => info!("Will output results to {path}"),
            AnalysisOutput::Terminal => {
                info!("No output filename provided, will list output in terminal")
            }
        }

        if let Some(path) = &self.output_fastq {
            info!("Will output modified fastq file as {path}");
        }

        let FilterOpts { len, quality } = &self.filter;
        info!("Minimum DNA sequence length to include {} bases", len.min);
        info!("Maximum DNA sequence length to include {} bases", len.max);
        info!("Minimum average Phred quality score to include {}", quality.min);
        info!("Maximum average Phred quality score to include {}", quality.max);

        if self.show_id {
            info!("Including sequence ID in output");
        } else {
            info!("Not including sequence ID in output");
        }
    }
}
