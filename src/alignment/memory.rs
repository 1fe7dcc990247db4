//! An in-memory alignment source backed by interval trees.

use std::collections::HashMap;
use std::convert::Infallible;
use std::iter;

use rust_lapper as lapper;

use crate::Region;
use crate::alignment::Alignment;
use crate::alignment::Alignments;

/// The inner value of the per-chromosome lookup data structure.
type Iv = lapper::Interval<u64, Alignment>;

/// An in-memory [`Source`](crate::alignment::Source).
///
/// Alignments are placed on 0-based, half-open intervals. Fetching a region
/// returns every alignment whose interval overlaps it, ordered by alignment
/// start (then end, then insertion order).
///
/// Generally, you will want to use a [`Builder`] to construct one of these.
#[derive(Debug)]
pub struct Source {
    /// The alignments on each chromosome.
    inner: HashMap<String, lapper::Lapper<u64, Alignment>>,
}

impl Source {
    /// Returns the total number of alignments held.
    pub fn len(&self) -> usize {
        self.inner.values().map(|lapper| lapper.len()).sum()
    }

    /// Returns whether the source holds no alignments.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl crate::alignment::Source for Source {
    type Error = Infallible;

    fn fetch(&mut self, region: &Region) -> Result<Alignments<'_, Self::Error>, Self::Error> {
        let entry = match self.inner.get(region.chromosome()) {
            Some(entry) if !region.is_empty() => entry,
            _ => return Ok(Box::new(iter::empty())),
        };

        Ok(Box::new(
            entry
                .find(region.start(), region.end())
                .map(|iv| Ok(iv.val.clone())),
        ))
    }
}

/// A builder for an in-memory [`Source`].
#[derive(Debug, Default)]
pub struct Builder {
    /// The alignments collected so far, by chromosome.
    intervals: HashMap<String, Vec<Iv>>,
}

impl Builder {
    /// Places an alignment on `chromosome` at `start..end` (0-based,
    /// half-open).
    ///
    /// # Examples
    ///
    /// ```
    /// use barcode_analysis::Alignment;
    /// use barcode_analysis::Region;
    /// use barcode_analysis::alignment::Source as _;
    /// use barcode_analysis::alignment::memory;
    ///
    /// let mut source = memory::Builder::default()
    ///     .push("chr1", 100, 150, Alignment::new("read1", "ACGT"))
    ///     .push("chr1", 500, 550, Alignment::new("read2", "TTTT"))
    ///     .build();
    ///
    /// let region = Region::try_new("chr1", 120, 200, "A")?;
    /// let alignments = source.fetch(&region)?.collect::<Result<Vec<_>, _>>()?;
    ///
    /// assert_eq!(alignments, [Alignment::new("read1", "ACGT")]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn push(
        mut self,
        chromosome: impl Into<String>,
        start: u64,
        end: u64,
        alignment: Alignment,
    ) -> Self {
        self.intervals
            .entry(chromosome.into())
            .or_default()
            .push(lapper::Interval {
                start,
                stop: end,
                val: alignment,
            });
        self
    }

    /// Builds the [`Source`].
    pub fn build(self) -> Source {
        let inner = self
            .intervals
            .into_iter()
            .map(|(chromosome, intervals)| (chromosome, lapper::Lapper::new(intervals)))
            .collect();

        Source { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Source as _;

    /// Fetches every alignment in `region` from `source`.
    fn fetch_all(source: &mut Source, region: &Region) -> Vec<Alignment> {
        source
            .fetch(region)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn source() -> Source {
        Builder::default()
            .push("chr1", 150, 160, Alignment::new("read3", "TTTT"))
            .push("chr1", 90, 110, Alignment::new("read1", "ACGT"))
            .push("chr1", 100, 120, Alignment::new("read2", "ACGT"))
            .push("chr1", 200, 210, Alignment::new("read4", "GGGG"))
            .push("chr2", 100, 120, Alignment::new("read5", "CCCC"))
            .build()
    }

    #[test]
    fn test_half_open_overlap() -> Result<(), Box<dyn std::error::Error>> {
        let mut source = source();
        let region = Region::try_new("chr1", 100, 200, "A")?;

        let ids = fetch_all(&mut source, &region)
            .into_iter()
            .map(|alignment| alignment.into_parts().0)
            .collect::<Vec<_>>();

        // read4 starts exactly at the region end and is excluded.
        assert_eq!(ids, ["read1", "read2", "read3"]);

        Ok(())
    }

    #[test]
    fn test_unknown_chromosome() -> Result<(), Box<dyn std::error::Error>> {
        let mut source = source();
        let region = Region::try_new("chrX", 0, 1_000, "X")?;
        assert!(fetch_all(&mut source, &region).is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_region() -> Result<(), Box<dyn std::error::Error>> {
        let mut source = source();
        let region = Region::try_new("chr1", 105, 105, "point")?;
        assert!(fetch_all(&mut source, &region).is_empty());
        Ok(())
    }

    #[test]
    fn test_fetch_is_repeatable() -> Result<(), Box<dyn std::error::Error>> {
        let mut source = source();
        let region = Region::try_new("chr1", 0, 1_000, "all")?;

        let first = fetch_all(&mut source, &region);
        let second = fetch_all(&mut source, &region);

        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
        assert_eq!(source.len(), 5);

        Ok(())
    }
}
