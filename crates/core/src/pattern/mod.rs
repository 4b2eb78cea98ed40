use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::board::{BoardSize, Coordinate};
use crate::{Result, SimonError};

/// Fixed-length pool of coordinates the player reproduces prefixes of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPattern {
    entries: Vec<Coordinate>,
}

impl HostPattern {
    /// Wraps an explicit sequence, e.g. a replayed or scripted game.
    pub fn from_entries(entries: Vec<Coordinate>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Coordinate] {
        &self.entries
    }

    /// Entry at `index`. Running off the end of the pool is fatal.
    pub fn get(&self, index: usize) -> Result<Coordinate> {
        self.entries
            .get(index)
            .copied()
            .ok_or(SimonError::PatternExhausted {
                index,
                len: self.entries.len(),
            })
    }

    /// Entries `[0..=last]`, i.e. `last + 1` coordinates.
    pub fn prefix(&self, last: usize) -> Result<&[Coordinate]> {
        if last >= self.entries.len() {
            return Err(SimonError::PatternExhausted {
                index: last,
                len: self.entries.len(),
            });
        }
        Ok(&self.entries[..=last])
    }
}

/// Draws coordinates independently and uniformly over the board, with
/// replacement.
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    size: BoardSize,
    length: usize,
    rng: ChaCha8Rng,
}

impl PatternGenerator {
    /// Creates a generator seeded from the thread-local RNG.
    pub fn new(size: BoardSize, length: usize) -> Self {
        Self::with_seed(size, length, rand::random())
    }

    /// Creates a reproducible generator.
    pub fn with_seed(size: BoardSize, length: usize, seed: u64) -> Self {
        Self {
            size,
            length,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn generate(&mut self) -> HostPattern {
        let entries = (0..self.length).map(|_| self.random_coordinate()).collect();
        HostPattern { entries }
    }

    /// Overwrites every entry of `pattern`. Nothing of the old pool survives.
    pub fn regenerate(&mut self, pattern: &mut HostPattern) {
        pattern.entries.resize(self.length, Coordinate::new(0, 0));
        for entry in pattern.entries.iter_mut() {
            *entry = self.random_coordinate();
        }
        tracing::debug!(length = self.length, "pattern regenerated");
    }

    fn random_coordinate(&mut self) -> Coordinate {
        Coordinate::new(
            self.rng.random_range(0..self.size.columns),
            self.rng.random_range(0..self.size.rows),
        )
    }
}
