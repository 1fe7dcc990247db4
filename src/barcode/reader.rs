//! A reader of barcode FASTQ files.
//!
//! Each FASTQ record pairs a read identifier (the record name) with the
//! barcode observed for that read (the record sequence). Qualities are
//! ignored.

use std::io;
use std::io::BufRead;
use std::path::Path;

use noodles::fastq;

use crate::barcode;
use crate::barcode::DuplicatePolicy;
use crate::barcode::Table;
use crate::input;

/// An error related to a barcode [`Reader`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error (including malformed FASTQ).
    Io(io::Error),

    /// The records could not be collected into a table.
    Table(barcode::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Table(err) => write!(f, "table error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A barcode FASTQ reader.
pub struct Reader<T>(fastq::io::Reader<T>)
where
    T: BufRead;

impl<T> std::fmt::Debug for Reader<T>
where
    T: BufRead,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader").finish_non_exhaustive()
    }
}

impl Reader<Box<dyn BufRead>> {
    /// Opens a barcode FASTQ file, decompressing it if the name ends in
    /// `.gz`.
    pub fn from_path<P>(path: P) -> io::Result<Self>
    where
        P: AsRef<Path>,
    {
        input::open(path).map(Self::new)
    }
}

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates a barcode reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use barcode_analysis::barcode;
    ///
    /// let data = b"@read1\nAAAA\n+\nFFFF\n";
    /// let mut reader = barcode::Reader::new(&data[..]);
    ///
    /// let pairs = reader.pairs().collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(pairs, [(String::from("read1"), String::from("AAAA"))]);
    ///
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn new(inner: T) -> Self {
        Self(fastq::io::Reader::new(inner))
    }

    /// Returns an iterator over the `(identifier, barcode)` pairs in the
    /// underlying reader.
    pub fn pairs(&mut self) -> impl Iterator<Item = io::Result<(String, String)>> + '_ {
        self.0.records().map(|result| {
            result.map(|record| {
                let id = String::from_utf8_lossy(record.name().as_ref()).into_owned();
                let barcode = String::from_utf8_lossy(record.sequence()).into_owned();
                (id, barcode)
            })
        })
    }

    /// Reads every record into a barcode [`Table`].
    ///
    /// # Examples
    ///
    /// ```
    /// use barcode_analysis::barcode;
    /// use barcode_analysis::barcode::DuplicatePolicy;
    ///
    /// let data = b"@read1\nAAAA\n+\nFFFF\n@read2 extra\nCCCC\n+\nFFFF\n";
    /// let reader = barcode::Reader::new(&data[..]);
    ///
    /// let table = reader.try_into_table(DuplicatePolicy::default())?;
    /// assert_eq!(table.lookup("read2"), Some("CCCC"));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_into_table(mut self, policy: DuplicatePolicy) -> Result<Table, Error> {
        let pairs = self
            .pairs()
            .collect::<io::Result<Vec<_>>>()
            .map_err(Error::Io)?;

        let table = Table::try_from_pairs(pairs, policy).map_err(Error::Table)?;
        tracing::debug!("read {} barcode(s)", table.len());

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::buffered;
    use crate::input::tests::gzip;

    /// Three records, the last of which repeats the first identifier.
    const FASTQ: &[u8] = b"@read1 1:N:0\nAAAA\n+\nFFFF\n\
                           @read2\nCCCC\n+\nFFFF\n\
                           @read1\nGGGG\n+\nFFFF\n";

    #[test]
    fn test_record_name_is_identifier() -> Result<(), Box<dyn std::error::Error>> {
        let mut reader = Reader::new(FASTQ);
        let pairs = reader.pairs().collect::<io::Result<Vec<_>>>()?;

        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0], (String::from("read1"), String::from("AAAA")));
        assert_eq!(pairs[1], (String::from("read2"), String::from("CCCC")));

        Ok(())
    }

    #[test]
    fn test_gzipped_input() -> Result<(), Box<dyn std::error::Error>> {
        let compressed = gzip(FASTQ);
        let reader = Reader::new(buffered(io::Cursor::new(compressed), true));

        let table = reader.try_into_table(DuplicatePolicy::LastWriteWins)?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("read1"), Some("GGGG"));
        assert_eq!(table.lookup("read2"), Some("CCCC"));

        Ok(())
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = Reader::new(FASTQ)
            .try_into_table(DuplicatePolicy::Reject)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Table(barcode::Error::DuplicateIdentifier(ref id)) if id == "read1"
        ));
    }

    #[test]
    fn test_malformed_fastq() {
        let err = Reader::new(&b"@read1\nAAAA\n-\nFFFF\n"[..])
            .try_into_table(DuplicatePolicy::default())
            .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_empty_input() -> Result<(), Box<dyn std::error::Error>> {
        let table = Reader::new(&b""[..]).try_into_table(DuplicatePolicy::default())?;
        assert!(table.is_empty());
        Ok(())
    }
}
