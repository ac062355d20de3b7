//! A fixed-width bit-vector over dense indices.
//!
//! The dataflow pass keeps three of these per basic block (reads, writes, dead stores),
//! each as wide as the method's local table. Because block and variable ids are dense and
//! never reused, they can be used directly as bit offsets.
//!
//! # Example
//!
//! ```rust
//! use flowgraph::utils::BitSet;
//!
//! let mut vars = BitSet::new(70);
//! vars.insert(3);
//! vars.set(64, true);
//!
//! assert!(vars.contains(64));
//! assert_eq!(vars.iter().collect::<Vec<_>>(), vec![3, 64]);
//! ```

const WORD_BITS: usize = u64::BITS as usize;

/// A fixed-width bit-vector.
///
/// Two sets compare equal when they have the same width and the same bits, which makes
/// whole-pass results directly comparable.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitSet {
    /// Backing storage, 64 indices per word.
    words: Vec<u64>,
    /// Number of addressable indices.
    len: usize,
}

impl BitSet {
    /// Creates an all-clear bit-vector addressing `len` indices.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Returns the number of addressable indices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    #[inline]
    fn locate(&self, index: usize) -> (usize, u64) {
        assert!(
            index < self.len,
            "bit index {index} out of range for width {}",
            self.len
        );
        (index / WORD_BITS, 1u64 << (index % WORD_BITS))
    }

    /// Sets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn insert(&mut self, index: usize) {
        let (word, mask) = self.locate(index);
        self.words[word] |= mask;
    }

    /// Clears the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn remove(&mut self, index: usize) {
        let (word, mask) = self.locate(index);
        self.words[word] &= !mask;
    }

    /// Sets or clears the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set(&mut self, index: usize, value: bool) {
        if value {
            self.insert(index);
        } else {
            self.remove(index);
        }
    }

    /// Returns `true` if the bit at `index` is set.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        let (word, mask) = self.locate(index);
        self.words[word] & mask != 0
    }

    /// Returns the number of set bits.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates the indices of set bits in ascending order.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            words: &self.words,
            word_idx: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl std::fmt::Debug for BitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Iterator over the set bits of a [`BitSet`].
pub struct BitSetIter<'a> {
    words: &'a [u64],
    word_idx: usize,
    /// Remaining bits of the current word.
    current: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_idx * WORD_BITS + bit);
            }
            self.word_idx += 1;
            self.current = *self.words.get(self.word_idx)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitset_set_and_query() {
        let mut bits = BitSet::new(130);
        assert!(bits.is_empty());

        bits.insert(0);
        bits.insert(63);
        bits.insert(64);
        bits.insert(129);

        assert_eq!(bits.count(), 4);
        assert!(bits.contains(63));
        assert!(bits.contains(64));
        assert!(!bits.contains(65));

        bits.set(63, false);
        assert!(!bits.contains(63));
        bits.remove(0);
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![64, 129]);
    }

    #[test]
    fn test_bitset_equality_includes_width() {
        let a = BitSet::new(10);
        let b = BitSet::new(11);
        assert_ne!(a, b);
        assert_eq!(a, BitSet::new(10));
    }

    #[test]
    fn test_bitset_zero_width() {
        let bits = BitSet::new(0);
        assert!(bits.is_empty());
        assert_eq!(bits.iter().count(), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_bitset_out_of_range() {
        let mut bits = BitSet::new(4);
        bits.insert(4);
    }

    #[test]
    fn test_bitset_debug() {
        let mut bits = BitSet::new(8);
        bits.insert(1);
        bits.insert(5);
        assert_eq!(format!("{bits:?}"), "{1, 5}");
    }
}
