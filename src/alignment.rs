//! Aligned reads and the sources that serve them by region.
//!
//! The aggregation engine only needs two things from an aligned read: its
//! identifier (to join against the barcode table) and its sequence. Anything
//! that can answer "which alignments overlap this region?" with those two
//! values can act as a [`Source`].
//!
//! Two sources are provided:
//!
//! - [`bam::Source`], which queries an indexed BAM file.
//! - [`memory::Source`], which holds alignments in an interval tree and is
//!   handy for tests and for embedding.

pub mod bam;
pub mod memory;

use crate::Region;

/// An aligned read, reduced to what is needed to correlate it with a barcode.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Alignment {
    /// The read identifier.
    read_identifier: String,
    /// The read sequence.
    read_sequence: String,
}

impl Alignment {
    /// Creates a new [`Alignment`].
    ///
    /// # Examples
    ///
    /// ```
    /// use barcode_analysis::Alignment;
    ///
    /// let alignment = Alignment::new("read1", "ACGT");
    /// assert_eq!(alignment.read_identifier(), "read1");
    /// assert_eq!(alignment.read_sequence(), "ACGT");
    /// ```
    pub fn new(read_identifier: impl Into<String>, read_sequence: impl Into<String>) -> Self {
        Self {
            read_identifier: read_identifier.into(),
            read_sequence: read_sequence.into(),
        }
    }

    /// Gets the read identifier.
    pub fn read_identifier(&self) -> &str {
        &self.read_identifier
    }

    /// Gets the read sequence.
    pub fn read_sequence(&self) -> &str {
        &self.read_sequence
    }

    /// Consumes self and returns the read identifier and sequence.
    pub fn into_parts(self) -> (String, String) {
        (self.read_identifier, self.read_sequence)
    }
}

/// A lazy, single-pass iterator over the alignments overlapping one region.
pub type Alignments<'a, E> = Box<dyn Iterator<Item = Result<Alignment, E>> + 'a>;

/// A region-queryable collection of aligned reads.
///
/// Each call to [`Source::fetch()`] returns a fresh, finite iterator. The
/// order of the alignments is up to the source but must be the same every
/// time the same region is fetched from the same source.
pub trait Source {
    /// The error type returned when fetching or reading alignments.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the alignments overlapping `region`.
    fn fetch(&mut self, region: &Region) -> Result<Alignments<'_, Self::Error>, Self::Error>;
}

impl<S> Source for &mut S
where
    S: Source + ?Sized,
{
    type Error = S::Error;

    fn fetch(&mut self, region: &Region) -> Result<Alignments<'_, Self::Error>, Self::Error> {
        (**self).fetch(region)
    }
}
