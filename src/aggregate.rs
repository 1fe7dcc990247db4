//! Region-scoped correlation of alignments with barcodes.
//!
//! An [`Aggregator`] walks a [`region::Set`](crate::region::Set) in order,
//! fetches the alignments overlapping each region from an alignment
//! [`Source`], resolves each alignment's read identifier through a barcode
//! [`Table`], and reports what it sees to an [`Observer`]. The most common
//! observer is [`Sequences`], which collects the distinct read sequences
//! seen for each barcode; [`Aggregator::aggregate()`] runs a scan with
//! exactly that observer.
//!
//! Every scan is bounded by a [`Budget`]: once as many alignments as the
//! budget allows have been examined, hit or miss, the scan stops, even in
//! the middle of a region. A result produced by an exhausted budget is a
//! partial sample of the regions, not a complete summary of them.
//! [`Report::budget_exhausted()`] tells the two apart.
//!
//! Read identifiers missing from the barcode table are handled according to
//! a [`LookupMissPolicy`]. A miss never borrows the barcode of a previous
//! alignment.
//!
//! ```
//! use barcode_analysis::Alignment;
//! use barcode_analysis::Region;
//! use barcode_analysis::aggregate;
//! use barcode_analysis::alignment::memory;
//! use barcode_analysis::barcode::Table;
//! use barcode_analysis::region::Set;
//!
//! let table = Table::from_iter([("read1", "AAAA"), ("read2", "AAAA"), ("read3", "CCCC")]);
//! let regions = Set::from(vec![Region::try_new("chr1", 100, 200, "A")?]);
//! let mut source = memory::Builder::default()
//!     .push("chr1", 100, 110, Alignment::new("read1", "ACGT"))
//!     .push("chr1", 120, 130, Alignment::new("read2", "ACGT"))
//!     .push("chr1", 140, 150, Alignment::new("read3", "TTTT"))
//!     .build();
//!
//! let aggregation = aggregate::aggregate(&table, &regions, &mut source, 100_000)?;
//!
//! assert_eq!(aggregation.sequences().len(), 2);
//! assert_eq!(aggregation.sequences()["AAAA"].len(), 1);
//! assert_eq!(aggregation.sequences()["CCCC"].len(), 1);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::Alignment;
use crate::Region;
use crate::alignment::Source;
use crate::barcode::Table;
use crate::region;

/// The number of alignments examined before a scan stops, unless configured
/// otherwise.
pub const DEFAULT_BUDGET: usize = 100_000;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to a scan.
#[derive(Debug)]
pub enum Error<E> {
    /// The alignment source failed.
    Source(E),

    /// A read identifier had no barcode while misses were fatal.
    LookupMiss {
        /// The unresolved read identifier.
        read_identifier: String,
        /// The region being scanned.
        region: Region,
    },
}

impl<E> std::fmt::Display for Error<E>
where
    E: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Source(err) => write!(f, "alignment source error: {err}"),
            Error::LookupMiss {
                read_identifier,
                region,
            } => write!(
                f,
                "no barcode for read `{}` in region `{}` ({}:{}-{})",
                read_identifier,
                region.label(),
                region.chromosome(),
                region.start(),
                region.end()
            ),
        }
    }
}

impl<E> std::error::Error for Error<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Source(err) => Some(err),
            Error::LookupMiss { .. } => None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Policies and budgets
////////////////////////////////////////////////////////////////////////////////////////

/// What to do with an alignment whose read identifier has no barcode.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LookupMissPolicy {
    /// Log the miss, count it, and move on to the next alignment. A miss
    /// consumes one unit of the budget, like a hit.
    #[default]
    Skip,

    /// Stop the scan with an [`Error::LookupMiss`].
    Fail,
}

/// A cap on the number of alignments examined by a scan.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Budget {
    /// The maximum number of alignments.
    limit: usize,
    /// The number of alignments consumed so far.
    used: usize,
}

impl Budget {
    /// Creates a fresh budget of `limit` alignments.
    ///
    /// # Examples
    ///
    /// ```
    /// use barcode_analysis::aggregate::Budget;
    ///
    /// let mut budget = Budget::new(1);
    /// assert!(budget.consume());
    /// assert!(!budget.consume());
    /// assert!(budget.is_exhausted());
    /// assert_eq!(budget.used(), 1);
    /// ```
    pub fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    /// Gets the limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Gets the number of alignments consumed.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Gets the number of alignments that may still be consumed.
    pub fn remaining(&self) -> usize {
        self.limit - self.used
    }

    /// Returns whether the budget has been used up.
    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }

    /// Consumes one alignment from the budget.
    ///
    /// Returns `false` (and consumes nothing) if the budget is already
    /// exhausted.
    pub fn consume(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }

        self.used += 1;
        true
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Observers
////////////////////////////////////////////////////////////////////////////////////////

/// A consumer of the events of a scan.
///
/// Tuples of two observers are observers too, so independent consumers can
/// share a single pass over the alignments.
pub trait Observer {
    /// Called before the alignments of `region` are fetched.
    fn region_started(&mut self, _region: &Region) {}

    /// Called for an alignment whose read identifier resolved to `barcode`.
    fn hit(&mut self, region: &Region, barcode: &str, alignment: &Alignment);

    /// Called for an alignment whose read identifier has no barcode (only
    /// under [`LookupMissPolicy::Skip`]).
    fn miss(&mut self, _region: &Region, _alignment: &Alignment) {}

    /// Called once the alignments of `region` have been consumed, or once the
    /// budget ran out within it.
    fn region_finished(&mut self, _region: &Region) {}
}

impl<O> Observer for &mut O
where
    O: Observer + ?Sized,
{
    fn region_started(&mut self, region: &Region) {
        (**self).region_started(region)
    }

    fn hit(&mut self, region: &Region, barcode: &str, alignment: &Alignment) {
        (**self).hit(region, barcode, alignment)
    }

    fn miss(&mut self, region: &Region, alignment: &Alignment) {
        (**self).miss(region, alignment)
    }

    fn region_finished(&mut self, region: &Region) {
        (**self).region_finished(region)
    }
}

impl<A, B> Observer for (A, B)
where
    A: Observer,
    B: Observer,
{
    fn region_started(&mut self, region: &Region) {
        self.0.region_started(region);
        self.1.region_started(region);
    }

    fn hit(&mut self, region: &Region, barcode: &str, alignment: &Alignment) {
        self.0.hit(region, barcode, alignment);
        self.1.hit(region, barcode, alignment);
    }

    fn miss(&mut self, region: &Region, alignment: &Alignment) {
        self.0.miss(region, alignment);
        self.1.miss(region, alignment);
    }

    fn region_finished(&mut self, region: &Region) {
        self.0.region_finished(region);
        self.1.region_finished(region);
    }
}

/// The distinct read sequences seen for each barcode.
///
/// Barcodes and their sequences iterate in lexicographic order.
pub type Sequences = BTreeMap<String, BTreeSet<String>>;

impl Observer for Sequences {
    fn hit(&mut self, _: &Region, barcode: &str, alignment: &Alignment) {
        let sequence = alignment.read_sequence();

        match self.get_mut(barcode) {
            Some(sequences) => {
                if !sequences.contains(sequence) {
                    sequences.insert(sequence.to_owned());
                }
            }
            None => {
                self.insert(
                    barcode.to_owned(),
                    BTreeSet::from([sequence.to_owned()]),
                );
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Results
////////////////////////////////////////////////////////////////////////////////////////

/// Counts describing a completed scan.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Report {
    /// The number of regions whose alignments were fetched.
    regions: usize,
    /// The number of alignments whose identifier resolved to a barcode.
    hits: usize,
    /// The number of alignments whose identifier had no barcode.
    misses: usize,
    /// Whether the scan stopped because the budget ran out.
    budget_exhausted: bool,
}

impl Report {
    /// Gets the number of regions whose alignments were fetched.
    pub fn regions(&self) -> usize {
        self.regions
    }

    /// Gets the number of alignments whose sequence was reported under a
    /// barcode.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Gets the number of alignments skipped because their read identifier
    /// had no barcode.
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Gets the number of alignments examined. This never exceeds the
    /// budget.
    pub fn examined(&self) -> usize {
        self.hits + self.misses
    }

    /// Returns whether the budget was used up.
    ///
    /// When this is `true`, the results may not cover every alignment in
    /// every region and must be treated as a partial sample.
    pub fn budget_exhausted(&self) -> bool {
        self.budget_exhausted
    }
}

/// The result of [`Aggregator::aggregate()`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Aggregation {
    /// The distinct sequences per barcode.
    sequences: Sequences,
    /// The scan counts.
    report: Report,
}

impl Aggregation {
    /// Gets the distinct sequences per barcode.
    pub fn sequences(&self) -> &Sequences {
        &self.sequences
    }

    /// Gets the scan counts.
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Consumes self and returns the distinct sequences per barcode.
    pub fn into_sequences(self) -> Sequences {
        self.sequences
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Aggregator
////////////////////////////////////////////////////////////////////////////////////////

/// A builder for an [`Aggregator`].
#[derive(Clone, Debug)]
pub struct Builder {
    /// The budget limit.
    budget: usize,
    /// The lookup miss policy.
    on_missing: LookupMissPolicy,
}

impl Builder {
    /// Sets the maximum number of alignments examined by a scan.
    pub fn budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Sets the policy for read identifiers without a barcode.
    pub fn on_missing(mut self, policy: LookupMissPolicy) -> Self {
        self.on_missing = policy;
        self
    }

    /// Builds the [`Aggregator`].
    ///
    /// # Examples
    ///
    /// ```
    /// use barcode_analysis::aggregate::Builder;
    /// use barcode_analysis::aggregate::LookupMissPolicy;
    ///
    /// let aggregator = Builder::default()
    ///     .budget(10)
    ///     .on_missing(LookupMissPolicy::Fail)
    ///     .build();
    ///
    /// assert_eq!(aggregator.budget(), 10);
    /// assert_eq!(aggregator.on_missing(), LookupMissPolicy::Fail);
    /// ```
    pub fn build(self) -> Aggregator {
        Aggregator {
            budget: self.budget,
            on_missing: self.on_missing,
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            on_missing: LookupMissPolicy::default(),
        }
    }
}

/// Correlates the alignments in a set of regions with their barcodes.
///
/// An aggregator holds only configuration. Every scan starts with a fresh
/// [`Budget`] and fresh results, so scanning the same inputs twice gives the
/// same answer.
#[derive(Clone, Debug)]
pub struct Aggregator {
    /// The budget limit for each scan.
    budget: usize,
    /// The lookup miss policy.
    on_missing: LookupMissPolicy,
}

impl Aggregator {
    /// Gets the budget limit for each scan.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Gets the lookup miss policy.
    pub fn on_missing(&self) -> LookupMissPolicy {
        self.on_missing
    }

    /// Collects the distinct read sequences for each barcode seen in
    /// `regions`.
    pub fn aggregate<S>(
        &self,
        table: &Table,
        regions: &region::Set,
        source: &mut S,
    ) -> Result<Aggregation, Error<S::Error>>
    where
        S: Source + ?Sized,
    {
        let mut sequences = Sequences::new();
        let report = self.scan(table, regions, source, &mut sequences)?;
        Ok(Aggregation { sequences, report })
    }

    /// Scans `regions` in order, reporting each alignment to `observer`.
    ///
    /// The scan stops before fetching another region, and before pulling
    /// another alignment, once the budget is exhausted.
    pub fn scan<S, O>(
        &self,
        table: &Table,
        regions: &region::Set,
        source: &mut S,
        observer: &mut O,
    ) -> Result<Report, Error<S::Error>>
    where
        S: Source + ?Sized,
        O: Observer + ?Sized,
    {
        let mut budget = Budget::new(self.budget);
        let mut report = Report::default();

        for region in regions {
            if budget.is_exhausted() {
                break;
            }

            tracing::debug!(
                "scanning region `{}` ({}:{}-{})",
                region.label(),
                region.chromosome(),
                region.start(),
                region.end()
            );

            observer.region_started(region);
            report.regions += 1;

            let mut alignments = source.fetch(region).map_err(Error::Source)?;

            while !budget.is_exhausted() {
                let alignment = match alignments.next() {
                    Some(result) => result.map_err(Error::Source)?,
                    None => break,
                };

                budget.consume();

                match table.lookup(alignment.read_identifier()) {
                    Some(barcode) => {
                        observer.hit(region, barcode, &alignment);
                        report.hits += 1;
                    }
                    None => match self.on_missing {
                        LookupMissPolicy::Skip => {
                            tracing::debug!(
                                "no barcode for read `{}` in region `{}`; skipping",
                                alignment.read_identifier(),
                                region.label()
                            );
                            observer.miss(region, &alignment);
                            report.misses += 1;
                        }
                        LookupMissPolicy::Fail => {
                            return Err(Error::LookupMiss {
                                read_identifier: alignment.into_parts().0,
                                region: region.clone(),
                            });
                        }
                    },
                }
            }

            observer.region_finished(region);
        }

        report.budget_exhausted = budget.is_exhausted();

        if report.budget_exhausted {
            tracing::warn!(
                "alignment budget of {} exhausted after {} of {} region(s); results are partial",
                budget.limit(),
                report.regions,
                regions.len()
            );
        }

        if report.misses > 0 {
            tracing::warn!(
                "skipped {} alignment(s) whose read had no barcode",
                report.misses
            );
        }

        tracing::info!(
            "scanned {} region(s): {} alignment(s) folded, {} lookup miss(es)",
            report.regions,
            report.hits,
            report.misses
        );

        Ok(report)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Builder::default().build()
    }
}

/// Collects the distinct read sequences for each barcode seen in `regions`,
/// examining at most `budget` alignments and skipping reads without a
/// barcode.
pub fn aggregate<S>(
    table: &Table,
    regions: &region::Set,
    source: &mut S,
    budget: usize,
) -> Result<Aggregation, Error<S::Error>>
where
    S: Source + ?Sized,
{
    Builder::default()
        .budget(budget)
        .build()
        .aggregate(table, regions, source)
}
