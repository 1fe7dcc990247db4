//! Opening of (possibly gzip-compressed) text inputs.

use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// The extension marking a gzip-compressed input.
const GZIP_EXTENSION: &str = "gz";

/// The capacity of the buffer wrapped around each input.
const BUFFER_CAPACITY: usize = 256 * 1024;

/// Opens the file at `path` for buffered reading.
///
/// Files ending in `.gz` are decompressed on the fly. Multi-member streams
/// (such as those produced by `bgzip`) are read through to the end.
pub fn open<P>(path: P) -> io::Result<Box<dyn BufRead>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)?;
    Ok(buffered(file, is_gzipped(path)))
}

/// Returns whether `path` names a gzip-compressed file.
fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(GZIP_EXTENSION))
        .unwrap_or(false)
}

/// Wraps `inner` in a buffer, decompressing it first if `gzipped` is set.
pub(crate) fn buffered<R>(inner: R, gzipped: bool) -> Box<dyn BufRead>
where
    R: Read + 'static,
{
    if gzipped {
        Box::new(BufReader::with_capacity(
            BUFFER_CAPACITY,
            MultiGzDecoder::new(inner),
        ))
    } else {
        Box::new(BufReader::with_capacity(BUFFER_CAPACITY, inner))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write as _;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    /// Compresses `data` as a single gzip member.
    pub(crate) fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_is_gzipped() {
        assert!(is_gzipped(Path::new("barcodes.fastq.gz")));
        assert!(is_gzipped(Path::new("BARCODES.FQ.GZ")));
        assert!(!is_gzipped(Path::new("barcodes.fastq")));
        assert!(!is_gzipped(Path::new("gz")));
    }

    #[test]
    fn test_buffered_multi_member() -> Result<(), Box<dyn std::error::Error>> {
        let mut data = gzip(b"hello\n");
        data.extend(gzip(b"world\n"));

        let lines = buffered(io::Cursor::new(data), true)
            .lines()
            .collect::<io::Result<Vec<_>>>()?;
        assert_eq!(lines, vec![String::from("hello"), String::from("world")]);

        Ok(())
    }

    #[test]
    fn test_open_missing_file() {
        let err = open("this/path/does/not/exist.bed").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
