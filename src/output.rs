//! Rendering of scan results.

use std::io;
use std::io::Write;

use crate::aggregate::Sequences;
use crate::summary::SUMMARY_HEADER;
use crate::summary::Summary;

/// Writes each barcode on its own line, followed by each of its distinct
/// sequences on their own lines.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
///
/// use barcode_analysis::aggregate::Sequences;
/// use barcode_analysis::output;
///
/// let mut sequences = Sequences::new();
/// sequences.insert(
///     String::from("AAAA"),
///     BTreeSet::from([String::from("ACGT"), String::from("TTTT")]),
/// );
///
/// let mut buffer = Vec::new();
/// output::write_sequences(&mut buffer, &sequences)?;
/// assert_eq!(buffer, b"AAAA\nACGT\nTTTT\n");
///
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn write_sequences<W>(writer: &mut W, sequences: &Sequences) -> io::Result<()>
where
    W: Write,
{
    for (barcode, sequences) in sequences {
        writeln!(writer, "{barcode}")?;

        for sequence in sequences {
            writeln!(writer, "{sequence}")?;
        }
    }

    Ok(())
}

/// Writes the summary header followed by one comma-separated row per
/// summary.
pub fn write_summaries<'a, W, I>(writer: &mut W, summaries: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Summary>,
{
    writeln!(writer, "{SUMMARY_HEADER}")?;

    for summary in summaries {
        writeln!(writer, "{summary}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Alignment;
    use crate::Region;
    use crate::aggregate::Aggregator;
    use crate::alignment::memory;
    use crate::barcode::Table;
    use crate::region;
    use crate::summary;

    #[test]
    fn test_write_sequences_orders_barcodes() -> Result<(), Box<dyn std::error::Error>> {
        let table = Table::from_iter([("read1", "CCCC"), ("read2", "AAAA"), ("read3", "CCCC")]);
        let mut source = memory::Builder::default()
            .push("chr1", 100, 110, Alignment::new("read1", "TTTT"))
            .push("chr1", 120, 130, Alignment::new("read2", "ACGT"))
            .push("chr1", 140, 150, Alignment::new("read3", "GGGG"))
            .build();
        let regions = region::Set::from(vec![Region::try_new("chr1", 100, 200, "A")?]);

        let aggregation = Aggregator::default().aggregate(&table, &regions, &mut source)?;

        let mut buffer = Vec::new();
        write_sequences(&mut buffer, aggregation.sequences())?;

        assert_eq!(
            String::from_utf8(buffer)?,
            "AAAA\nACGT\nCCCC\nGGGG\nTTTT\n"
        );

        Ok(())
    }

    #[test]
    fn test_write_empty_sequences() -> Result<(), Box<dyn std::error::Error>> {
        let mut buffer = Vec::new();
        write_sequences(&mut buffer, &Sequences::new())?;
        assert!(buffer.is_empty());
        Ok(())
    }

    #[test]
    fn test_write_summaries() -> Result<(), Box<dyn std::error::Error>> {
        let table = Table::from_iter([("read1", "AAAA")]);
        let mut source = memory::Builder::default()
            .push("chr1", 100, 110, Alignment::new("read1", "ACGT"))
            .push("chr1", 120, 130, Alignment::new("read2", "ACGT"))
            .build();
        let regions = region::Set::from(vec![
            Region::try_new("chr1", 100, 200, "A")?,
            Region::try_new("chr1", 300, 400, "B")?,
        ]);

        let rows = summary::summarize(&Aggregator::default(), &table, &regions, &mut source)?;

        let mut buffer = Vec::new();
        write_summaries(&mut buffer, &rows)?;

        assert_eq!(
            String::from_utf8(buffer)?,
            "NAME,NUM_READS,NUM_BARCODES,NUM_BARCODES/NUM_READS,NUM_HITS,NUM_MISSES\n\
             A,2,1,0.5,1,1\n\
             B,0,0,NA,0,0\n"
        );

        Ok(())
    }
}
