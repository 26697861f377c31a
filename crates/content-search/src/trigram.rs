//! Trigram packing shared by the index builder and the search engine.
//!
//! A text unit is one byte of the file (or of the pattern's UTF-8 encoding).
//! Three consecutive units are packed big-endian into the low 24 bits of a
//! `u32`. Working on raw bytes keeps the pre-filter exact: a pattern that
//! occurs in a file contributes only byte windows the file also has.

use fnv::FnvHashSet;

/// A 24-bit packed trigram.
pub type Trigram = u32;

/// Per-file trigram set.
pub type TrigramSet = FnvHashSet<Trigram>;

const TRIGRAM_MASK: u32 = 0x00FF_FFFF;

/// Packs three units into a trigram.
#[inline]
pub fn pack(a: u8, b: u8, c: u8) -> Trigram {
    ((a as u32) << 16) | ((b as u32) << 8) | c as u32
}

/// Returns the distinct trigrams of a pattern in first-seen order.
///
/// Patterns shorter than three units yield no trigrams, which makes every
/// record a candidate.
pub fn pattern_trigrams(pattern: &[u8]) -> Vec<Trigram> {
    let mut seen = FnvHashSet::default();
    pattern
        .windows(3)
        .map(|window| pack(window[0], window[1], window[2]))
        .filter(|trigram| seen.insert(*trigram))
        .collect()
}

/// Streams chunks of a file into trigrams.
///
/// The last two units of every chunk are carried into the next one, so
/// windows spanning a chunk boundary are produced exactly once and the
/// resulting set does not depend on the chunk size.
#[derive(Debug, Default, Clone)]
pub struct TrigramAccumulator {
    /// Up to the last two units seen, right-aligned.
    carry: u32,
    /// How many units `carry` holds (0..=2).
    carried: u8,
}

impl TrigramAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next chunk, calling `insert` for every completed window.
    pub fn feed(&mut self, chunk: &[u8], mut insert: impl FnMut(Trigram)) {
        let mut window = self.carry;
        let mut filled = self.carried;
        for &unit in chunk {
            window = ((window << 8) | unit as u32) & TRIGRAM_MASK;
            if filled < 2 {
                filled += 1;
            } else {
                insert(window);
            }
        }
        self.carry = window & 0xFFFF;
        self.carried = filled;
    }
}
