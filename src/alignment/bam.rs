//! An alignment source backed by an indexed BAM file.

use std::fs::File;
use std::io;
use std::iter;
use std::path::Path;

use noodles::bam;
use noodles::bgzf;
use noodles::core;
use noodles::core::Position;
use noodles::sam;

use crate::Region;
use crate::alignment::Alignment;
use crate::alignment::Alignments;

/// The read identifier given to records that carry no name.
pub const MISSING_READ_NAME: &str = "*";

/// An indexed BAM reader over a file.
type IndexedReader = bam::io::IndexedReader<bgzf::Reader<File>>;

/// An error related to a BAM [`Source`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error (opening, reading the index or header, or decoding a
    /// record).
    Io(io::Error),

    /// A region that cannot be expressed as a BAM query.
    InvalidRegion(Region),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::InvalidRegion(region) => write!(
                f,
                "invalid query region: {}:{}-{}",
                region.chromosome(),
                region.start(),
                region.end()
            ),
        }
    }
}

impl std::error::Error for Error {}

/// An indexed BAM [`Source`](crate::alignment::Source).
///
/// The index (`.bai` or `.csi`) is expected alongside the BAM file.
pub struct Source {
    /// The indexed reader.
    reader: IndexedReader,
    /// The BAM header.
    header: sam::Header,
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field(
                "reference_sequences",
                &self.header.reference_sequences().len(),
            )
            .finish_non_exhaustive()
    }
}

impl Source {
    /// Opens an indexed BAM file and reads its header.
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let mut reader = bam::io::indexed_reader::Builder::default()
            .build_from_path(path)
            .map_err(Error::Io)?;
        let header = reader.read_header().map_err(Error::Io)?;

        Ok(Self { reader, header })
    }

    /// Gets the BAM header.
    pub fn header(&self) -> &sam::Header {
        &self.header
    }
}

impl crate::alignment::Source for Source {
    type Error = Error;

    fn fetch(&mut self, region: &Region) -> Result<Alignments<'_, Self::Error>, Self::Error> {
        if region.is_empty() {
            return Ok(Box::new(iter::empty()));
        }

        if !self
            .header
            .reference_sequences()
            .contains_key(region.chromosome().as_bytes())
        {
            tracing::warn!(
                "chromosome `{}` is not in the BAM header; region `{}` has no alignments",
                region.chromosome(),
                region.label()
            );
            return Ok(Box::new(iter::empty()));
        }

        let query_region = query_region(region)?;
        let query = self
            .reader
            .query(&self.header, &query_region)
            .map_err(Error::Io)?;

        Ok(Box::new(query.map(|result| {
            result.map(|record| to_alignment(&record)).map_err(Error::Io)
        })))
    }
}

/// Translates a 0-based, half-open region into a 1-based, closed query
/// region.
fn query_region(region: &Region) -> Result<core::Region, Error> {
    let invalid = || Error::InvalidRegion(region.clone());

    let start = usize::try_from(region.start())
        .ok()
        .and_then(|start| start.checked_add(1))
        .and_then(|start| Position::try_from(start).ok())
        .ok_or_else(invalid)?;
    let end = usize::try_from(region.end())
        .ok()
        .and_then(|end| Position::try_from(end).ok())
        .ok_or_else(invalid)?;

    let interval = core::region::Interval::from(start..=end);
    Ok(core::Region::new(region.chromosome().to_string(), interval))
}

/// Reduces a BAM record to its name and sequence.
fn to_alignment(record: &bam::Record) -> Alignment {
    let read_identifier = record
        .name()
        .map(|name| String::from_utf8_lossy(name.as_ref()).into_owned())
        .unwrap_or_else(|| String::from(MISSING_READ_NAME));
    let read_sequence = record.sequence().iter().map(char::from).collect::<String>();

    Alignment::new(read_identifier, read_sequence)
}
