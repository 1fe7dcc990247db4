//! Genomic regions of interest.
//!
//! A [`Region`] is a 0-based, half-open interval on a chromosome along with a
//! human-readable label.
//!
//! ```text
//! ================ chr1 ===============
//!
//! | 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 |
//! -------------------------------------
//! |   |   | X | X | X | X | O |   |   |  <= chr1:2-6
//! ```
//!
//! Regions are read from a tab-delimited, four-column file (`chromosome`,
//! `start`, `end`, `label`) using a [`Reader`] and are collected, in input
//! order, into a [`Set`].

pub mod reader;

use std::io;
use std::num::ParseIntError;
use std::path::Path;
use std::str::FromStr;

pub use reader::Reader;

use crate::input;

/// The delimiter for a region record.
pub const REGION_DELIMITER: char = '\t';

/// The number of expected fields in a region record.
pub const NUM_REGION_FIELDS: usize = 4;

/// An error associated with parsing a region record.
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An incorrect number of fields in the region record.
    IncorrectNumberOfFields(usize),
    /// An invalid start position.
    InvalidStart(ParseIntError),
    /// An invalid end position.
    InvalidEnd(ParseIntError),
    /// The start position is greater than the end position.
    StartGreaterThanEnd(u64, u64),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(n) => write!(
                f,
                "invalid number of fields in region: expected {} fields, found {} fields",
                NUM_REGION_FIELDS, n
            ),
            ParseError::InvalidStart(err) => write!(f, "invalid start: {}", err),
            ParseError::InvalidEnd(err) => write!(f, "invalid end: {}", err),
            ParseError::StartGreaterThanEnd(start, end) => write!(
                f,
                "start position ({}) is greater than the end position ({})",
                start, end
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// An error related to reading a region [`Set`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// A well-shaped record that could not be parsed.
    InvalidRecord(usize, ParseError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::InvalidRecord(line_no, err) => {
                write!(f, "invalid region record at line {line_no}: {err}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A labelled, 0-based, half-open genomic interval.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Region {
    /// The chromosome name.
    chromosome: String,
    /// The start position (inclusive).
    start: u64,
    /// The end position (exclusive).
    end: u64,
    /// The label.
    label: String,
}

impl Region {
    /// Attempts to create a new [`Region`].
    ///
    /// # Examples
    ///
    /// ```
    /// use barcode_analysis::Region;
    ///
    /// let region = Region::try_new("chr1", 100, 200, "A")?;
    /// assert_eq!(region.chromosome(), "chr1");
    /// assert_eq!(region.len(), 100);
    ///
    /// assert!(Region::try_new("chr1", 200, 100, "B").is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(
        chromosome: impl Into<String>,
        start: u64,
        end: u64,
        label: impl Into<String>,
    ) -> Result<Self, ParseError> {
        if start > end {
            return Err(ParseError::StartGreaterThanEnd(start, end));
        }

        Ok(Self {
            chromosome: chromosome.into(),
            start,
            end,
            label: label.into(),
        })
    }

    /// Gets the chromosome name.
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    /// Gets the start position (0-based, inclusive).
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Gets the end position (0-based, exclusive).
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Gets the label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Gets the number of positions spanned by the region.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns whether the region spans no positions.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl FromStr for Region {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(REGION_DELIMITER).collect::<Vec<_>>();

        if parts.len() != NUM_REGION_FIELDS {
            return Err(ParseError::IncorrectNumberOfFields(parts.len()));
        }

        let start = parts[1].parse().map_err(ParseError::InvalidStart)?;
        let end = parts[2].parse().map_err(ParseError::InvalidEnd)?;

        Region::try_new(parts[0], start, end, parts[3])
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}{}{}{}{}",
            self.chromosome,
            REGION_DELIMITER,
            self.start,
            REGION_DELIMITER,
            self.end,
            REGION_DELIMITER,
            self.label
        )
    }
}

/// An ordered collection of regions.
///
/// Regions are kept in input order. Overlapping and repeated regions are
/// allowed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Set(Vec<Region>);

impl Set {
    /// Reads a region set from the file at `path`, decompressing it if the
    /// name ends in `.gz`.
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let inner = input::open(path).map_err(Error::Io)?;
        Reader::new(inner).regions().collect()
    }

    /// Returns an iterator over the regions in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.0.iter()
    }

    /// Returns the number of regions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Region> for Set {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Region>> for Set {
    fn from(regions: Vec<Region>) -> Self {
        Self(regions)
    }
}

impl<'a> IntoIterator for &'a Set {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_region() -> Result<(), Box<dyn std::error::Error>> {
        let region = "chr1\t100\t200\tA".parse::<Region>()?;

        assert_eq!(region.chromosome(), "chr1");
        assert_eq!(region.start(), 100);
        assert_eq!(region.end(), 200);
        assert_eq!(region.label(), "A");
        assert_eq!(region.len(), 100);
        assert_eq!(region.to_string(), "chr1\t100\t200\tA");

        Ok(())
    }

    #[test]
    fn test_label_with_spaces() -> Result<(), Box<dyn std::error::Error>> {
        let region = "chr2\t0\t10\tmy favourite gene".parse::<Region>()?;
        assert_eq!(region.label(), "my favourite gene");
        Ok(())
    }

    #[test]
    fn test_empty_region() -> Result<(), Box<dyn std::error::Error>> {
        let region = "chr1\t5\t5\tpoint".parse::<Region>()?;
        assert!(region.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_number_of_fields() {
        let err = "chr1\t100\t200".parse::<Region>().unwrap_err();

        assert_eq!(err, ParseError::IncorrectNumberOfFields(3));
        assert_eq!(
            err.to_string(),
            "invalid number of fields in region: expected 4 fields, found 3 fields"
        );
    }

    #[test]
    fn test_invalid_start() {
        let err = "chr1\t?\t200\tA".parse::<Region>().unwrap_err();
        assert_eq!(err.to_string(), "invalid start: invalid digit found in string");
    }

    #[test]
    fn test_invalid_end() {
        let err = "chr1\t100\t-1\tA".parse::<Region>().unwrap_err();
        assert_eq!(err.to_string(), "invalid end: invalid digit found in string");
    }

    #[test]
    fn test_start_greater_than_end() {
        let err = "chr1\t200\t100\tA".parse::<Region>().unwrap_err();
        assert_eq!(err, ParseError::StartGreaterThanEnd(200, 100));
    }

    #[test]
    fn test_set_preserves_input_order() -> Result<(), Box<dyn std::error::Error>> {
        let set = Set::from(vec![
            Region::try_new("chr2", 0, 10, "B")?,
            Region::try_new("chr1", 0, 10, "A")?,
            Region::try_new("chr2", 0, 10, "B")?,
        ]);

        let labels = set.iter().map(Region::label).collect::<Vec<_>>();
        assert_eq!(labels, ["B", "A", "B"]);
        assert_eq!(set.len(), 3);

        Ok(())
    }

    #[test]
    fn test_set_from_missing_path() {
        let err = Set::from_path("this/path/does/not/exist.bed").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
