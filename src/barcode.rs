//! A lookup table of read identifiers to barcode sequences.

pub mod reader;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

pub use reader::Reader;

/// An error related to a barcode [`Table`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// A read identifier was seen more than once while duplicates were being
    /// rejected.
    DuplicateIdentifier(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DuplicateIdentifier(id) => {
                write!(f, "duplicate read identifier in barcode table: {id}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// How to resolve a read identifier that appears more than once.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DuplicatePolicy {
    /// The barcode seen last replaces any earlier barcode.
    #[default]
    LastWriteWins,

    /// Building the table fails on the first repeated identifier.
    Reject,
}

/// An immutable mapping of read identifiers to barcode sequences.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Table(HashMap<String, String>);

impl Table {
    /// Attempts to build a [`Table`] from `(identifier, barcode)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use barcode_analysis::barcode::DuplicatePolicy;
    /// use barcode_analysis::barcode::Table;
    ///
    /// let pairs = [("read1", "AAAA"), ("read1", "CCCC")];
    ///
    /// let table = Table::try_from_pairs(pairs, DuplicatePolicy::LastWriteWins)?;
    /// assert_eq!(table.lookup("read1"), Some("CCCC"));
    ///
    /// assert!(Table::try_from_pairs(pairs, DuplicatePolicy::Reject).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_from_pairs<I, K, V>(pairs: I, policy: DuplicatePolicy) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut inner = HashMap::new();

        for (id, barcode) in pairs {
            match inner.entry(id.into()) {
                Entry::Vacant(entry) => {
                    entry.insert(barcode.into());
                }
                Entry::Occupied(entry) => match policy {
                    DuplicatePolicy::LastWriteWins => {
                        *entry.into_mut() = barcode.into();
                    }
                    DuplicatePolicy::Reject => {
                        return Err(Error::DuplicateIdentifier(entry.key().clone()));
                    }
                },
            }
        }

        Ok(Self(inner))
    }

    /// Looks up the barcode for a read identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use barcode_analysis::barcode::Table;
    ///
    /// let table = Table::from_iter([("read1", "AAAA")]);
    ///
    /// assert_eq!(table.lookup("read1"), Some("AAAA"));
    /// assert_eq!(table.lookup("read2"), None);
    /// ```
    pub fn lookup(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    /// Returns the number of read identifiers in the table.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the `(identifier, barcode)` entries in
    /// arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, barcode)| (id.as_str(), barcode.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Table
where
    K: Into<String>,
    V: Into<String>,
{
    /// Collects pairs with [`DuplicatePolicy::LastWriteWins`].
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(id, barcode)| (id.into(), barcode.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_hit_and_miss() {
        let table = Table::from_iter([("read1", "AAAA"), ("read2", "AAAA"), ("read3", "CCCC")]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("read1"), Some("AAAA"));
        assert_eq!(table.lookup("read2"), Some("AAAA"));
        assert_eq!(table.lookup("read3"), Some("CCCC"));
        assert_eq!(table.lookup("read4"), None);
    }

    #[test]
    fn test_last_write_wins() -> Result<(), Box<dyn std::error::Error>> {
        let table = Table::try_from_pairs(
            [("read1", "AAAA"), ("read2", "GGGG"), ("read1", "TTTT")],
            DuplicatePolicy::LastWriteWins,
        )?;

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("read1"), Some("TTTT"));

        Ok(())
    }

    #[test]
    fn test_reject_duplicates() {
        let err = Table::try_from_pairs(
            [("read1", "AAAA"), ("read1", "TTTT")],
            DuplicatePolicy::Reject,
        )
        .unwrap_err();

        assert_eq!(err, Error::DuplicateIdentifier(String::from("read1")));
        assert_eq!(
            err.to_string(),
            "duplicate read identifier in barcode table: read1"
        );
    }

    #[test]
    fn test_empty_table() {
        let table = Table::default();
        assert!(table.is_empty());
        assert_eq!(table.lookup(""), None);
    }
}
