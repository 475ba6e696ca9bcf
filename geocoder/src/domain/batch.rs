//! Fixed-capacity windows over an address sequence.

use std::fmt;

/// Largest batch the regional provider accepts in one call.
pub const MAX_BATCH_SIZE: usize = 100;

/// A consecutive window over the full address sequence.
///
/// Batches are numbered from 1 and remember their offset into the full
/// sequence, so errors and logs can point at the records involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    number: usize,
    offset: usize,
    addresses: &'a [String],
}

impl<'a> Batch<'a> {
    /// Create a batch directly. `number` is 1-based.
    pub fn new(number: usize, offset: usize, addresses: &'a [String]) -> Self {
        Self {
            number,
            offset,
            addresses,
        }
    }

    /// Split `addresses` into consecutive batches of at most `size` elements.
    ///
    /// A `size` of zero is treated as one.
    pub fn partition(addresses: &'a [String], size: usize) -> impl Iterator<Item = Batch<'a>> {
        let size = size.max(1);
        addresses
            .chunks(size)
            .enumerate()
            .map(move |(idx, chunk)| Batch::new(idx + 1, idx * size, chunk))
    }

    pub fn number(&self) -> usize {
        self.number
    }

    /// Index of the first address of this batch in the full sequence.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn addresses(&self) -> &'a [String] {
        self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl fmt::Display for Batch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch {} (records {}-{})",
            self.number,
            self.offset + 1,
            self.offset + self.addresses.len()
        )
    }
}
