//! `barcode_analysis` is a crate for correlating aligned reads with their
//! barcodes across genomic regions of interest.
//!
//! Given a set of regions, a table of read identifiers to barcodes, and an
//! indexed collection of aligned reads, the crate determines, for every
//! barcode observed within the regions, the distinct read sequences carried
//! under that barcode.
//!
//! The crate is made up of a few parts:
//!
//! - A barcode [`Table`](barcode::Table), usually read from a (gzipped)
//!   FASTQ file with a [`barcode::Reader`].
//! - A region [`Set`](region::Set), read from a tab-delimited, four-column
//!   file with a [`region::Reader`].
//! - An alignment [`Source`](alignment::Source) answering overlap queries.
//!   [`alignment::bam::Source`] reads indexed BAM files and
//!   [`alignment::memory::Source`] holds alignments in memory.
//! - The [`aggregate::Aggregator`], which walks the regions in order and
//!   folds each alignment's sequence into the set for its barcode, stopping
//!   once a global budget of alignments has been used up.
//! - [`summary::Summaries`], which computes per-region statistics from the
//!   same scan, and the [`output`] writers.
//!
//! Below is a representative example of how these fit together.
//!
//! ```
//! use barcode_analysis::Alignment;
//! use barcode_analysis::aggregate;
//! use barcode_analysis::alignment::memory;
//! use barcode_analysis::barcode;
//! use barcode_analysis::barcode::DuplicatePolicy;
//! use barcode_analysis::output;
//! use barcode_analysis::region;
//!
//! let fastq = b"@read1\nAAAA\n+\nFFFF\n@read2\nAAAA\n+\nFFFF\n@read3\nCCCC\n+\nFFFF\n";
//! let table = barcode::Reader::new(&fastq[..]).try_into_table(DuplicatePolicy::default())?;
//!
//! let coords = b"chr1\t100\t200\tA\n";
//! let regions = region::Reader::new(&coords[..])
//!     .regions()
//!     .collect::<Result<region::Set, _>>()?;
//!
//! let mut source = memory::Builder::default()
//!     .push("chr1", 100, 110, Alignment::new("read1", "ACGT"))
//!     .push("chr1", 120, 130, Alignment::new("read2", "ACGT"))
//!     .push("chr1", 140, 150, Alignment::new("read3", "TTTT"))
//!     .build();
//!
//! let aggregation = aggregate::aggregate(&table, &regions, &mut source, 100_000)?;
//!
//! let mut buffer = Vec::new();
//! output::write_sequences(&mut buffer, aggregation.sequences())?;
//! assert_eq!(buffer, b"AAAA\nACGT\nCCCC\nTTTT\n");
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod aggregate;
pub mod alignment;
pub mod barcode;
pub mod input;
pub mod output;
pub mod region;
pub mod summary;

pub use alignment::Alignment;
pub use region::Region;
