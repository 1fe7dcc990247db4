//! Per-region summary statistics.
//!
//! [`Summaries`] is an [`Observer`] that records one [`Summary`] row per
//! scanned region. It can be run on its own or alongside
//! [`Sequences`](crate::aggregate::Sequences) in a single pass:
//!
//! ```
//! use barcode_analysis::Alignment;
//! use barcode_analysis::Region;
//! use barcode_analysis::aggregate::Aggregator;
//! use barcode_analysis::aggregate::Sequences;
//! use barcode_analysis::alignment::memory;
//! use barcode_analysis::barcode::Table;
//! use barcode_analysis::region::Set;
//! use barcode_analysis::summary::Summaries;
//!
//! let table = Table::from_iter([("read1", "AAAA"), ("read2", "CCCC")]);
//! let regions = Set::from(vec![Region::try_new("chr1", 0, 100, "A")?]);
//! let mut source = memory::Builder::default()
//!     .push("chr1", 10, 20, Alignment::new("read1", "ACGT"))
//!     .push("chr1", 30, 40, Alignment::new("read2", "TTTT"))
//!     .push("chr1", 50, 60, Alignment::new("read9", "GGGG"))
//!     .build();
//!
//! let mut sequences = Sequences::new();
//! let mut summaries = Summaries::default();
//! Aggregator::default().scan(
//!     &table,
//!     &regions,
//!     &mut source,
//!     &mut (&mut sequences, &mut summaries),
//! )?;
//!
//! let summary = &summaries.rows()[0];
//! assert_eq!(summary.reads(), 3);
//! assert_eq!(summary.barcodes(), 2);
//! assert_eq!(summary.misses(), 1);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashSet;

use crate::Alignment;
use crate::Region;
use crate::aggregate::Aggregator;
use crate::aggregate::Error;
use crate::aggregate::Observer;
use crate::alignment::Source;
use crate::barcode::Table;
use crate::region;

/// The column names of a summary table.
pub const SUMMARY_HEADER: &str =
    "NAME,NUM_READS,NUM_BARCODES,NUM_BARCODES/NUM_READS,NUM_HITS,NUM_MISSES";

/// The delimiter between summary columns.
const SUMMARY_DELIMITER: char = ',';

/// The placeholder for a ratio with no reads.
const NOT_AVAILABLE: &str = "NA";

/// The statistics for a single region.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Summary {
    /// The region label.
    label: String,
    /// The number of alignments examined.
    reads: usize,
    /// The number of distinct barcodes among the hits.
    barcodes: usize,
    /// The number of alignments whose read had a barcode.
    hits: usize,
    /// The number of alignments whose read had no barcode.
    misses: usize,
}

impl Summary {
    /// Gets the region label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Gets the number of alignments examined in the region.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Gets the number of distinct barcodes seen in the region.
    pub fn barcodes(&self) -> usize {
        self.barcodes
    }

    /// Gets the number of distinct barcodes per examined alignment, or
    /// [`None`] if no alignments were examined.
    pub fn ratio(&self) -> Option<f64> {
        match self.reads {
            0 => None,
            reads => Some(self.barcodes as f64 / reads as f64),
        }
    }

    /// Gets the number of alignments whose read had a barcode.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Gets the number of alignments whose read had no barcode.
    pub fn misses(&self) -> usize {
        self.misses
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ratio = self
            .ratio()
            .map(|ratio| ratio.to_string())
            .unwrap_or_else(|| String::from(NOT_AVAILABLE));

        write!(
            f,
            "{}{d}{}{d}{}{d}{}{d}{}{d}{}",
            self.label,
            self.reads,
            self.barcodes,
            ratio,
            self.hits,
            self.misses,
            d = SUMMARY_DELIMITER
        )
    }
}

/// A summary row under construction.
#[derive(Debug)]
struct InProgress {
    /// The counts so far.
    summary: Summary,
    /// The barcodes seen so far.
    barcodes: HashSet<String>,
}

/// An [`Observer`] collecting one [`Summary`] per scanned region.
///
/// Regions that the scan never reached (because the budget ran out) have no
/// row.
#[derive(Debug, Default)]
pub struct Summaries {
    /// The finished rows, in scan order.
    rows: Vec<Summary>,
    /// The row for the region being scanned.
    current: Option<InProgress>,
}

impl Summaries {
    /// Gets the finished rows in scan order.
    pub fn rows(&self) -> &[Summary] {
        &self.rows
    }

    /// Consumes self and returns the finished rows.
    pub fn into_rows(self) -> Vec<Summary> {
        self.rows
    }
}

impl Observer for Summaries {
    fn region_started(&mut self, region: &Region) {
        self.current = Some(InProgress {
            summary: Summary {
                label: region.label().to_string(),
                reads: 0,
                barcodes: 0,
                hits: 0,
                misses: 0,
            },
            barcodes: HashSet::new(),
        });
    }

    fn hit(&mut self, _: &Region, barcode: &str, _: &Alignment) {
        if let Some(current) = self.current.as_mut() {
            current.summary.reads += 1;
            current.summary.hits += 1;

            if !current.barcodes.contains(barcode) {
                current.barcodes.insert(barcode.to_string());
            }
        }
    }

    fn miss(&mut self, _: &Region, _: &Alignment) {
        if let Some(current) = self.current.as_mut() {
            current.summary.reads += 1;
            current.summary.misses += 1;
        }
    }

    fn region_finished(&mut self, _: &Region) {
        if let Some(InProgress {
            mut summary,
            barcodes,
        }) = self.current.take()
        {
            summary.barcodes = barcodes.len();
            self.rows.push(summary);
        }
    }
}

/// Scans `regions` with `aggregator` and returns one [`Summary`] per scanned
/// region.
pub fn summarize<S>(
    aggregator: &Aggregator,
    table: &Table,
    regions: &region::Set,
    source: &mut S,
) -> Result<Vec<Summary>, Error<S::Error>>
where
    S: Source + ?Sized,
{
    let mut summaries = Summaries::default();
    aggregator.scan(table, regions, source, &mut summaries)?;
    Ok(summaries.into_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Builder;
    use crate::alignment::memory;

    fn table() -> Table {
        Table::from_iter([("read1", "AAAA"), ("read2", "AAAA"), ("read3", "CCCC")])
    }

    fn source() -> memory::Source {
        memory::Builder::default()
            .push("chr1", 100, 110, Alignment::new("read1", "ACGT"))
            .push("chr1", 120, 130, Alignment::new("read2", "ACGT"))
            .push("chr1", 140, 150, Alignment::new("read3", "TTTT"))
            .push("chr2", 10, 20, Alignment::new("read4", "GGGG"))
            .push("chr2", 30, 40, Alignment::new("read1", "GGGG"))
            .build()
    }

    #[test]
    fn test_rows_per_region() -> Result<(), Box<dyn std::error::Error>> {
        let regions = region::Set::from(vec![
            Region::try_new("chr1", 100, 200, "A")?,
            Region::try_new("chr2", 0, 100, "B")?,
            Region::try_new("chr3", 0, 100, "C")?,
        ]);

        let rows = summarize(&Aggregator::default(), &table(), &regions, &mut source())?;
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].label(), "A");
        assert_eq!(rows[0].reads(), 3);
        assert_eq!(rows[0].barcodes(), 2);
        assert_eq!(rows[0].hits(), 3);
        assert_eq!(rows[0].misses(), 0);
        assert_eq!(rows[0].to_string(), format!("A,3,2,{},3,0", 2.0 / 3.0));

        assert_eq!(rows[1].to_string(), "B,2,1,0.5,1,1");
        assert_eq!(rows[2].to_string(), "C,0,0,NA,0,0");

        Ok(())
    }

    #[test]
    fn test_unreached_regions_have_no_row() -> Result<(), Box<dyn std::error::Error>> {
        let regions = region::Set::from(vec![
            Region::try_new("chr1", 100, 200, "A")?,
            Region::try_new("chr2", 0, 100, "B")?,
        ]);
        let aggregator = Builder::default().budget(2).build();

        let rows = summarize(&aggregator, &table(), &regions, &mut source())?;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reads(), 2);
        assert_eq!(rows[0].barcodes(), 1);

        Ok(())
    }

    #[test]
    fn test_repeated_scans_give_equal_rows() -> Result<(), Box<dyn std::error::Error>> {
        fn rows_are_eq<T: Eq>(_: &[T]) {}

        let regions = region::Set::from(vec![Region::try_new("chr2", 0, 100, "B")?]);

        let first = summarize(&Aggregator::default(), &table(), &regions, &mut source())?;
        let second = summarize(&Aggregator::default(), &table(), &regions, &mut source())?;

        rows_are_eq(&first);
        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn test_header() {
        assert_eq!(SUMMARY_HEADER.split(SUMMARY_DELIMITER).count(), 6);
    }
}
