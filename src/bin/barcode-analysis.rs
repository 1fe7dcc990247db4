//! A binary to correlate the reads in an indexed BAM file with their barcodes
//! across a set of genomic regions.
//!
//! ```shell
//! cargo run --release --bin=barcode-analysis --features=binaries -- \
//!     --coords regions.tsv --barcodes barcodes.fastq.gz reads.bam
//! ```
//!
//! For every barcode observed within the regions, the barcode is printed on
//! its own line followed by each distinct read sequence seen under it. With
//! `--summary`, a per-region statistics table follows.
//!
//! The exit status is `0` on success, `1` when an input cannot be read or
//! processed, and `2` when the command line is invalid.

use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use anyhow::Result;
use barcode_analysis::aggregate;
use barcode_analysis::aggregate::Aggregator;
use barcode_analysis::aggregate::DEFAULT_BUDGET;
use barcode_analysis::aggregate::LookupMissPolicy;
use barcode_analysis::aggregate::Sequences;
use barcode_analysis::alignment::Source;
use barcode_analysis::alignment::bam;
use barcode_analysis::barcode;
use barcode_analysis::barcode::DuplicatePolicy;
use barcode_analysis::output;
use barcode_analysis::region;
use barcode_analysis::summary::Summaries;
use clap::Parser;
use clap::ValueEnum;
use clap_verbosity_flag::Verbosity;
use clap_verbosity_flag::WarnLevel;
use tracing::error;
use tracing::info;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// The name printed in error messages.
const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

/// The exit status for unreadable or unprocessable inputs.
///
/// Command line errors exit with status `2` from within `clap`.
const EXIT_FILE_IO_ERROR: u8 = 1;

////////////////////////////////////////////////////////////////////////////////////////
// Arguments
////////////////////////////////////////////////////////////////////////////////////////

/// What to do with a read that has no barcode.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OnMissing {
    /// Log the read and move on.
    Skip,

    /// Stop with an error.
    Fail,
}

impl From<OnMissing> for LookupMissPolicy {
    fn from(value: OnMissing) -> Self {
        match value {
            OnMissing::Skip => LookupMissPolicy::Skip,
            OnMissing::Fail => LookupMissPolicy::Fail,
        }
    }
}

/// Lists the distinct read sequences carried by each barcode within a set of
/// genomic regions.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// File containing the coordinates of genomic regions (tab-delimited
    /// chromosome, start, end, and label).
    #[arg(long, value_name = "FILE")]
    coords: PathBuf,

    /// File containing read barcodes in FASTQ format (gzipped when the name
    /// ends in `.gz`).
    #[arg(long, value_name = "FILE")]
    barcodes: PathBuf,

    /// Input BAM file (indexed).
    #[arg(value_name = "BAM_FILE")]
    bam_file: PathBuf,

    /// Record program progress in LOG_FILE.
    #[arg(long, value_name = "LOG_FILE")]
    log: Option<PathBuf>,

    /// The maximum number of alignments to examine across all regions.
    #[arg(long, default_value_t = DEFAULT_BUDGET)]
    budget: usize,

    /// What to do with a read that has no barcode.
    #[arg(long, value_enum, default_value_t = OnMissing::Skip)]
    on_missing: OnMissing,

    /// Also print a summary row for each scanned region.
    #[arg(long, default_value_t = false)]
    summary: bool,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

////////////////////////////////////////////////////////////////////////////////////////
// Logging
////////////////////////////////////////////////////////////////////////////////////////

/// Installs the global subscriber.
///
/// Without `--log`, events go to stderr at the level chosen by the verbosity
/// flags. With `--log`, events go to the file at debug level. `RUST_LOG`
/// overrides the level in either case.
fn init_logging(args: &Args) -> Result<()> {
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .map(|_| EnvFilter::from_default_env());

    match &args.log {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file `{}`", path.display()))?;
            let builder = tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_ansi(false);

            match env_filter {
                Some(filter) => builder.with_env_filter(filter).init(),
                None => builder.with_max_level(LevelFilter::DEBUG).init(),
            }

            info!("program started");
            info!(
                "command line: {}",
                std::env::args().collect::<Vec<_>>().join(" ")
            );
        }
        None => {
            let builder = tracing_subscriber::fmt().with_writer(io::stderr);

            match env_filter {
                Some(filter) => builder.with_env_filter(filter).init(),
                None => builder
                    .with_max_level(args.verbose.log_level_filter().as_trace())
                    .init(),
            }
        }
    }

    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////
// Main
////////////////////////////////////////////////////////////////////////////////////////

/// Scans `regions`, collecting per-region summaries only when `summary` is
/// set.
fn scan<S>(
    aggregator: &Aggregator,
    table: &barcode::Table,
    regions: &region::Set,
    source: &mut S,
    summary: bool,
) -> Result<(Sequences, Option<Summaries>), aggregate::Error<S::Error>>
where
    S: Source + ?Sized,
{
    let mut sequences = Sequences::new();
    let mut summaries = summary.then(Summaries::default);

    match summaries.as_mut() {
        Some(summaries) => {
            aggregator.scan(table, regions, source, &mut (&mut sequences, summaries))?
        }
        None => aggregator.scan(table, regions, source, &mut sequences)?,
    };

    Ok((sequences, summaries))
}

/// Reads the inputs, scans the regions, and writes the results to stdout.
fn run(args: &Args) -> Result<()> {
    let table = barcode::Reader::from_path(&args.barcodes)
        .with_context(|| format!("opening barcode file `{}`", args.barcodes.display()))?
        .try_into_table(DuplicatePolicy::LastWriteWins)
        .with_context(|| format!("reading barcode file `{}`", args.barcodes.display()))?;
    info!(
        "read {} barcode(s) from `{}`",
        table.len(),
        args.barcodes.display()
    );

    let regions = region::Set::from_path(&args.coords)
        .with_context(|| format!("reading coordinates file `{}`", args.coords.display()))?;
    info!(
        "read {} region(s) from `{}`",
        regions.len(),
        args.coords.display()
    );

    let mut source = bam::Source::from_path(&args.bam_file)
        .with_context(|| format!("opening BAM file `{}`", args.bam_file.display()))?;

    let aggregator = aggregate::Builder::default()
        .budget(args.budget)
        .on_missing(args.on_missing.into())
        .build();

    let (sequences, summaries) = scan(&aggregator, &table, &regions, &mut source, args.summary)
        .with_context(|| format!("scanning BAM file `{}`", args.bam_file.display()))?;

    let mut writer = BufWriter::new(io::stdout().lock());

    output::write_sequences(&mut writer, &sequences).context("writing sequences")?;

    if let Some(summaries) = &summaries {
        output::write_summaries(&mut writer, summaries.rows()).context("writing summaries")?;
    }

    writer.flush().context("flushing output")?;

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = init_logging(&args) {
        eprintln!("{PROGRAM_NAME} ERROR: {err:#}, exiting");
        return ExitCode::from(EXIT_FILE_IO_ERROR);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("{PROGRAM_NAME} ERROR: {err:#}, exiting");
            ExitCode::from(EXIT_FILE_IO_ERROR)
        }
    }
}
