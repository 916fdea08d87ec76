use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::Parser;
use std::ffi::OsString;

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
🧬 gmNano-LQ version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   per-read length and average PHRED quality for Nanopore .fastq files";

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

/// Short flags that are two letters long. clap only understands single-character short flags,
/// so these are rewritten to their long form before parsing.
const TWO_LETTER_FLAGS: [(&str, &str); 5] = [
    ("-of", "--output_fastq"),
    ("-dn", "--DNAmin"),
    ("-dm", "--DNAmax"),
    ("-qn", "--Qualitymin"),
    ("-qm", "--Qualitymax"),
];

#[derive(Parser, Debug)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    styles = STYLES
)]
pub struct Cli {
    /// the input .fastq file (required). gzipped files must be decompressed first
    #[arg(short, long, value_name = "FASTQ")]
    pub input: Option<String>,

    /// the output analysis file, appended to if it exists. if not given, the analysis is
    /// written to the terminal
    #[arg(short, long, value_name = "TXT")]
    pub output: Option<String>,

    /// [-of] output .fastq file, appended to if it exists. every included read is written with
    /// `-gmNano-LQ-D<length>-Q<quality>-` added to its sequence ID
    #[arg(long = "output_fastq", value_name = "FASTQ")]
    pub output_fastq: Option<String>,

    /// [-dn] minimum DNA sequence length to include (rounded down)
    #[arg(long = "DNAmin", value_name = "LENGTH", allow_negative_numbers = true)]
    pub dna_min: Option<String>,

    /// [-dm] maximum DNA sequence length to include (rounded down)
    #[arg(long = "DNAmax", value_name = "LENGTH", allow_negative_numbers = true)]
    pub dna_max: Option<String>,

    /// [-qn] minimum average PHRED quality score to include
    #[arg(long = "Qualitymin", value_name = "QUALITY", allow_negative_numbers = true)]
    pub quality_min: Option<String>,

    /// [-qm] maximum average PHRED quality score to include
    #[arg(long = "Qualitymax", value_name = "QUALITY", allow_negative_numbers = true)]
    pub quality_max: Option<String>,

    /// don't include the sequence ID in the analysis output
    #[arg(short, long = "suppress_sequenceID")]
    pub suppress_sequence_id: bool,

    /// report the settings and progress of the analysis
    #[arg(short, long)]
    pub verbose: bool,
}

/// Rewrites `-of`, `-dn`, `-dm`, `-qn` and `-qm` (including their `-xx=value` forms) into the
/// long flags that clap knows about. All other arguments are passed through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(|arg| {
            let arg: OsString = arg.into();
            arg.to_str().and_then(rewrite_flag).unwrap_or(arg)
        })
        .collect()
}

fn rewrite_flag(arg: &str) -> Option<OsString> {
    TWO_LETTER_FLAGS.iter().find_map(|(short, long)| {
        if arg == *short {
            return Some(OsString::from(long));
        }
        let value = arg.strip_prefix(short)?.strip_prefix('=')?;
        Some(OsString::from(format!("{long}={value}")))
    })
}
