//! A region file reader.

use std::io;
use std::io::BufRead;
use std::iter;

use crate::region::Error;
use crate::region::ParseError;
use crate::region::Region;

/// The new line character.
const NEW_LINE: char = '\n';

/// The carriage return character.
const CARRIAGE_RETURN: char = '\r';

/// The prefix of a comment line.
const COMMENT_PREFIX: &str = "#";

/// The prefixes of BED header lines.
const HEADER_PREFIXES: &[&str] = &["track", "browser"];

/// A region file reader.
#[derive(Clone, Debug)]
pub struct Reader<T>(T)
where
    T: BufRead;

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates a region file reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use barcode_analysis::region;
    ///
    /// let data = b"chr1\t100\t200\tA\n";
    /// let reader = region::Reader::new(&data[..]);
    /// ```
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Consumes self and returns the inner reader.
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Reads a raw, textual line from the underlying reader.
    ///
    /// The trailing line ending (`\n` or `\r\n`) is removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// use barcode_analysis::region;
    ///
    /// let data = b"chr1\t100\t200\tA\r\nchr1\t300\t400\tB";
    /// let mut reader = region::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 16);
    /// assert_eq!(buffer, "chr1\t100\t200\tA");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 14);
    /// assert_eq!(buffer, "chr1\t300\t400\tB");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 0);
    ///
    /// # Ok::<(), io::Error>(())
    /// ```
    pub fn read_line_raw(&mut self, buffer: &mut String) -> io::Result<usize> {
        read_line(&mut self.0, buffer)
    }

    /// Returns an iterator over the regions in the underlying reader.
    ///
    /// Records without exactly four fields are skipped, as are blank lines,
    /// comments, and BED `track`/`browser` lines. A four-field record that
    /// cannot be parsed ends the iteration with an
    /// [`Error::InvalidRecord`].
    ///
    /// # Examples
    ///
    /// ```
    /// use barcode_analysis::region;
    ///
    /// let data = b"chr1\t100\t200\nchr1\t300\t400\tB\n";
    /// let mut reader = region::Reader::new(&data[..]);
    ///
    /// let regions = reader.regions().collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(regions.len(), 1);
    /// assert_eq!(regions[0].label(), "B");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn regions(&mut self) -> impl Iterator<Item = Result<Region, Error>> + '_ {
        let mut buffer = String::new();
        let mut line_no = 0usize;

        iter::from_fn(move || loop {
            match self.read_line_raw(&mut buffer) {
                Ok(0) => return None,
                Ok(_) => line_no += 1,
                Err(e) => return Some(Err(Error::Io(e))),
            }

            if is_ignored(&buffer) {
                continue;
            }

            match buffer.parse::<Region>() {
                Ok(region) => return Some(Ok(region)),
                Err(ParseError::IncorrectNumberOfFields(n)) => {
                    tracing::trace!("skipping region record with {n} field(s) at line {line_no}");
                }
                Err(e) => return Some(Err(Error::InvalidRecord(line_no, e))),
            }
        })
    }
}

impl<T> From<T> for Reader<T>
where
    T: BufRead,
{
    fn from(inner: T) -> Self {
        Self(inner)
    }
}

/// Returns whether a line carries no region record.
fn is_ignored(line: &str) -> bool {
    line.trim().is_empty()
        || line.starts_with(COMMENT_PREFIX)
        || HEADER_PREFIXES
            .iter()
            .any(|prefix| line.split_whitespace().next() == Some(*prefix))
}

/// Reads a line from a buffered reader, trimming the line ending.
fn read_line<T>(reader: &mut T, buffer: &mut String) -> io::Result<usize>
where
    T: BufRead,
{
    buffer.clear();

    let n = reader.read_line(buffer)?;

    if buffer.ends_with(NEW_LINE) {
        buffer.pop();

        if buffer.ends_with(CARRIAGE_RETURN) {
            buffer.pop();
        }
    }

    Ok(n)
}
