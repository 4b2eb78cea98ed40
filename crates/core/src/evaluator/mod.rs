use crate::board::{BoardSize, Coordinate};
use crate::pattern::HostPattern;
use crate::{Result, SimonError};

/// Outcome of judging one tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Correct, more taps needed this round.
    Continue,
    /// Correct, and it was the last tap of the round.
    RoundComplete,
    Mismatch,
}

/// Level and in-round progress.
///
/// Round `level` asks for entries `[0..=level]`, so `tiles_tapped` never
/// exceeds `level`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    level: usize,
    tiles_tapped: usize,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress part-way through a round. `tiles_tapped` is clamped to `level`.
    pub fn at(level: usize, tiles_tapped: usize) -> Self {
        Self {
            level,
            tiles_tapped: tiles_tapped.min(level),
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn tiles_tapped(&self) -> usize {
        self.tiles_tapped
    }

    /// Back to level 0.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn start_round(&mut self) {
        self.tiles_tapped = 0;
    }

    /// Moves to the next level. The next round must still fit in a pool of
    /// `pool_len` entries.
    pub fn advance_round(&mut self, pool_len: usize) -> Result<()> {
        let next = self.level + 1;
        if next >= pool_len {
            return Err(SimonError::PatternExhausted {
                index: next,
                len: pool_len,
            });
        }
        self.level = next;
        self.tiles_tapped = 0;
        Ok(())
    }
}

/// Compares taps against the expected pattern entry.
#[derive(Debug, Clone, Copy)]
pub struct InputEvaluator {
    size: BoardSize,
}

impl InputEvaluator {
    pub fn new(size: BoardSize) -> Self {
        Self { size }
    }

    /// Judges `tapped` against `pattern[tiles_tapped]`.
    ///
    /// `Continue` also counts the tap in `progress`. The other verdicts leave
    /// `progress` untouched so the caller can apply the round transition.
    pub fn evaluate(
        &self,
        progress: &mut Progress,
        pattern: &HostPattern,
        tapped: Coordinate,
    ) -> Result<Verdict> {
        let tapped = self.size.check(tapped)?;
        let expected = pattern.get(progress.tiles_tapped)?;

        let verdict = if tapped != expected {
            Verdict::Mismatch
        } else if progress.tiles_tapped == progress.level {
            Verdict::RoundComplete
        } else {
            progress.tiles_tapped += 1;
            Verdict::Continue
        };

        tracing::debug!(
            %tapped,
            %expected,
            level = progress.level,
            tiles_tapped = progress.tiles_tapped,
            ?verdict,
            "tap evaluated"
        );
        Ok(verdict)
    }
}
