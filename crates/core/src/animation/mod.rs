//! Strictly sequential press/release playback on the board.
//!
//! A playback is a flat list of [`RevealPhase`]s. Each phase waits one step
//! delay and then touches the board, so a single reveal step costs two delays
//! and steps can never overlap. Progress is driven by wakeups on the shared
//! [`Scheduler`]: every wakeup applies exactly one phase and queues the next.

use std::fmt;
use std::time::Duration;

use crate::board::{Board, BoardSize, Coordinate};
use crate::pattern::HostPattern;
use crate::timeline::Scheduler;
use crate::Result;

/// Half of a reveal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    /// Enter the pressed state and sound the tile's tone.
    Press(Coordinate),
    Release(Coordinate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackId(u64);

/// What a playback is showing. Used for logging and by hosts that care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackKind {
    Pattern,
    Flash,
    TapFeedback,
}

/// Invoked exactly once, after the last release of a playback.
pub type OnComplete = Box<dyn FnOnce(PlaybackId)>;

/// Reported by [`AnimationSequencer::advance`] when a playback ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackFinished {
    pub id: PlaybackId,
    pub kind: PlaybackKind,
}

struct Playback {
    id: PlaybackId,
    kind: PlaybackKind,
    step_delay: Duration,
    phases: std::vec::IntoIter<RevealPhase>,
    on_complete: Option<OnComplete>,
}

impl fmt::Debug for Playback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playback")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("step_delay", &self.step_delay)
            .field("remaining_phases", &self.phases.len())
            .finish()
    }
}

/// Runs playbacks against a [`Board`]. Playbacks started separately are not
/// serialised against each other; only the phases within one playback are.
#[derive(Debug, Default)]
pub struct AnimationSequencer {
    active: Vec<Playback>,
    next_id: u64,
}

impl AnimationSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts revealing `coordinates` in order and returns without touching
    /// the board. The first press happens one `step_delay` from now.
    pub fn play<W: From<PlaybackId>>(
        &mut self,
        coordinates: &[Coordinate],
        step_delay: Duration,
        kind: PlaybackKind,
        on_complete: Option<OnComplete>,
        scheduler: &mut Scheduler<W>,
    ) -> PlaybackId {
        let id = PlaybackId(self.next_id);
        self.next_id += 1;

        let phases: Vec<RevealPhase> = coordinates
            .iter()
            .flat_map(|&c| [RevealPhase::Press(c), RevealPhase::Release(c)])
            .collect();
        let first_wait = if phases.is_empty() {
            Duration::ZERO
        } else {
            step_delay
        };

        tracing::debug!(?id, ?kind, steps = coordinates.len(), ?step_delay, "playback started");
        self.active.push(Playback {
            id,
            kind,
            step_delay,
            phases: phases.into_iter(),
            on_complete,
        });
        scheduler.schedule(first_wait, W::from(id));
        id
    }

    /// Applies the next phase of playback `id`. Returns the completion notice
    /// when that phase was the last one. Unknown ids are ignored.
    pub fn advance<B: Board + ?Sized, W: From<PlaybackId>>(
        &mut self,
        id: PlaybackId,
        board: &mut B,
        scheduler: &mut Scheduler<W>,
    ) -> Option<PlaybackFinished> {
        let index = self.active.iter().position(|playback| playback.id == id)?;
        let playback = &mut self.active[index];

        match playback.phases.next() {
            Some(RevealPhase::Press(coordinate)) => {
                board.highlight(coordinate, true);
                board.play_tone(coordinate);
            }
            Some(RevealPhase::Release(coordinate)) => board.highlight(coordinate, false),
            None => {}
        }

        if !playback.phases.as_slice().is_empty() {
            scheduler.schedule(playback.step_delay, W::from(id));
            return None;
        }

        let mut finished = self.active.remove(index);
        tracing::debug!(?id, kind = ?finished.kind, "playback finished");
        if let Some(on_complete) = finished.on_complete.take() {
            on_complete(id);
        }
        Some(PlaybackFinished {
            id,
            kind: finished.kind,
        })
    }

    pub fn is_active(&self, id: PlaybackId) -> bool {
        self.active.iter().any(|playback| playback.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}

/// Pattern entries `[0..=pattern_length]`: a round at level `n` shows `n + 1`
/// tiles.
pub fn pattern_prefix(pattern: &HostPattern, pattern_length: usize) -> Result<&[Coordinate]> {
    pattern.prefix(pattern_length)
}

/// Decorative corner chase: the four corners, `revs + 1` times over.
pub fn flash_cycle(size: BoardSize, revs: u32) -> Vec<Coordinate> {
    let corners = size.corners();
    (0..=revs).flat_map(|_| corners).collect()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::board::{BoardSize, GridLayout};
    use crate::render::{BoardEvent, RecordingBoard};

    fn board() -> RecordingBoard {
        RecordingBoard::new(GridLayout::new(BoardSize::default(), 100.0, 100.0))
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Drives every due wakeup up to `now` and returns finished playbacks.
    fn run_until(
        sequencer: &mut AnimationSequencer,
        board: &mut RecordingBoard,
        scheduler: &mut Scheduler<PlaybackId>,
        now: Duration,
    ) -> Vec<PlaybackFinished> {
        let mut finished = Vec::new();
        while let Some(event) = scheduler.pop_due(now) {
            if let Some(done) = sequencer.advance(event.payload, board, scheduler) {
                finished.push(done);
            }
        }
        scheduler.advance_to(now);
        finished
    }

    #[test]
    fn play_returns_before_touching_board() {
        let mut sequencer = AnimationSequencer::new();
        let mut scheduler: Scheduler<PlaybackId> = Scheduler::new();
        let board = board();

        let id = sequencer.play(
            &[Coordinate::new(0, 0)],
            ms(200),
            PlaybackKind::Pattern,
            None,
            &mut scheduler,
        );

        assert!(sequencer.is_active(id));
        assert!(board.events().is_empty());
        assert_eq!(scheduler.next_deadline(), Some(ms(200)));
    }

    #[test]
    fn three_steps_complete_after_six_delays() {
        let mut sequencer = AnimationSequencer::new();
        let mut scheduler: Scheduler<PlaybackId> = Scheduler::new();
        let mut board = board();
        let completed = Rc::new(Cell::new(0));
        let counter = Rc::clone(&completed);

        let steps = [Coordinate::new(0, 0), Coordinate::new(1, 1), Coordinate::new(0, 0)];
        sequencer.play(
            &steps,
            ms(50),
            PlaybackKind::Pattern,
            Some(Box::new(move |_| counter.set(counter.get() + 1))),
            &mut scheduler,
        );

        for now in 0..300 {
            run_until(&mut sequencer, &mut board, &mut scheduler, ms(now));
            assert_eq!(completed.get(), 0, "completed early at {now} ms");
        }
        let finished = run_until(&mut sequencer, &mut board, &mut scheduler, ms(300));
        assert_eq!(completed.get(), 1);
        assert_eq!(finished.len(), 1);
        assert!(sequencer.is_idle());

        run_until(&mut sequencer, &mut board, &mut scheduler, ms(1000));
        assert_eq!(completed.get(), 1);
    }

    #[test]
    fn steps_never_overlap() {
        let mut sequencer = AnimationSequencer::new();
        let mut scheduler: Scheduler<PlaybackId> = Scheduler::new();
        let mut board = board();

        let steps = [Coordinate::new(0, 0), Coordinate::new(0, 0), Coordinate::new(1, 0)];
        sequencer.play(&steps, ms(50), PlaybackKind::Pattern, None, &mut scheduler);
        run_until(&mut sequencer, &mut board, &mut scheduler, ms(10_000));

        let mut expected = Vec::new();
        for step in steps {
            expected.extend([
                BoardEvent::Pressed(step),
                BoardEvent::Tone(step),
                BoardEvent::Released(step),
            ]);
        }
        assert_eq!(board.events(), expected.as_slice());
    }

    #[test]
    fn phases_follow_the_step_delay() {
        let mut sequencer = AnimationSequencer::new();
        let mut scheduler: Scheduler<PlaybackId> = Scheduler::new();
        let mut board = board();
        let tile = Coordinate::new(1, 1);

        sequencer.play(&[tile], ms(100), PlaybackKind::TapFeedback, None, &mut scheduler);

        run_until(&mut sequencer, &mut board, &mut scheduler, ms(99));
        assert!(board.events().is_empty());
        run_until(&mut sequencer, &mut board, &mut scheduler, ms(100));
        assert!(board.is_pressed(tile));
        run_until(&mut sequencer, &mut board, &mut scheduler, ms(199));
        assert!(board.is_pressed(tile));
        let finished = run_until(&mut sequencer, &mut board, &mut scheduler, ms(200));
        assert!(!board.is_pressed(tile));
        assert_eq!(finished[0].kind, PlaybackKind::TapFeedback);
    }

    #[test]
    fn coarse_ticks_keep_the_same_timeline() {
        let mut sequencer = AnimationSequencer::new();
        let mut scheduler: Scheduler<PlaybackId> = Scheduler::new();
        let mut board = board();
        let completed_at = Rc::new(Cell::new(None));
        let slot = Rc::clone(&completed_at);

        sequencer.play(
            &flash_cycle(BoardSize::default(), 0),
            ms(50),
            PlaybackKind::Flash,
            Some(Box::new(move |_| slot.set(Some(())))),
            &mut scheduler,
        );

        let finished = run_until(&mut sequencer, &mut board, &mut scheduler, ms(10_000));
        assert_eq!(finished.len(), 1);
        assert!(completed_at.get().is_some());
        assert_eq!(board.events().len(), 12);
    }

    #[test]
    fn empty_playback_completes_on_next_dispatch() {
        let mut sequencer = AnimationSequencer::new();
        let mut scheduler: Scheduler<PlaybackId> = Scheduler::new();
        let mut board = board();

        sequencer.play(&[], ms(200), PlaybackKind::Pattern, None, &mut scheduler);
        let finished = run_until(&mut sequencer, &mut board, &mut scheduler, Duration::ZERO);

        assert_eq!(finished.len(), 1);
        assert!(board.events().is_empty());
    }

    #[test]
    fn separate_playbacks_interleave() {
        let mut sequencer = AnimationSequencer::new();
        let mut scheduler: Scheduler<PlaybackId> = Scheduler::new();
        let mut board = board();

        let flash = sequencer.play(
            &flash_cycle(BoardSize::default(), 3),
            ms(50),
            PlaybackKind::Flash,
            None,
            &mut scheduler,
        );
        let tap = sequencer.play(
            &[Coordinate::new(1, 0)],
            ms(100),
            PlaybackKind::TapFeedback,
            None,
            &mut scheduler,
        );
        assert_eq!(sequencer.active_count(), 2);

        let finished = run_until(&mut sequencer, &mut board, &mut scheduler, ms(200));
        assert_eq!(finished.iter().map(|f| f.id).collect::<Vec<_>>(), vec![tap]);
        assert!(sequencer.is_active(flash));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut sequencer = AnimationSequencer::new();
        let mut scheduler: Scheduler<PlaybackId> = Scheduler::new();
        let mut board = board();
        assert!(sequencer
            .advance(PlaybackId(42), &mut board, &mut scheduler)
            .is_none());
    }

    #[test]
    fn flash_cycle_runs_revs_plus_one_times() {
        let cycle = flash_cycle(BoardSize::default(), 3);
        assert_eq!(cycle.len(), 16);
        assert_eq!(&cycle[..4], &BoardSize::default().corners());
        assert_eq!(&cycle[12..], &BoardSize::default().corners());
    }

    #[test]
    fn pattern_prefix_includes_level_entry() {
        let entries = vec![
            Coordinate::new(1, 0),
            Coordinate::new(0, 1),
            Coordinate::new(1, 1),
        ];
        let pattern = HostPattern::from_entries(entries.clone());
        assert_eq!(pattern_prefix(&pattern, 0).unwrap(), &entries[..1]);
        assert_eq!(pattern_prefix(&pattern, 1).unwrap(), &entries[..2]);
    }
}
