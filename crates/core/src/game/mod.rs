//! The game state machine.
//!
//! [`SimonGame`] owns every piece of mutable game state: the current
//! [`GameState`], level and in-round progress, the pattern pool, and the reset
//! guard. Hosts only reach it through [`SimonGame::on_tap_down`] and
//! [`SimonGame::on_tick`]; the board collaborator only ever receives
//! highlight/tone requests.
//!
//! Everything runs on the caller's thread. Delayed transitions and animation
//! phases are wakeups on one [`Scheduler`], dispatched in deadline order from
//! `on_tick`.

use std::fmt;
use std::time::Duration;

use crate::animation::{flash_cycle, AnimationSequencer, PlaybackId, PlaybackKind};
use crate::board::{Board, BoardSize, Coordinate, ScreenPoint};
use crate::config::{AppConfig, TimingConfig};
use crate::evaluator::{InputEvaluator, Progress, Verdict};
use crate::pattern::{HostPattern, PatternGenerator};
use crate::timeline::{EventId, Scheduler};
use crate::{Result, SimonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameState {
    #[default]
    StartScreen,
    /// Momentary: the next tick starts the reveal and moves to `UserPattern`.
    HostPattern,
    UserPattern,
    DeadReset,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::StartScreen => "start-screen",
            GameState::HostPattern => "host-pattern",
            GameState::UserPattern => "user-pattern",
            GameState::DeadReset => "dead-reset",
        };
        f.write_str(name)
    }
}

/// A state change and the virtual time it happened at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: GameState,
    pub to: GameState,
    pub at: Duration,
}

/// What became of a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The current state does not take input.
    Ignored,
    /// The touch did not land on any tile.
    NoTile,
    /// The tap left the start screen.
    Started,
    Judged(Verdict),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wakeup {
    EnterHostPattern,
    Playback(PlaybackId),
}

impl From<PlaybackId> for Wakeup {
    fn from(id: PlaybackId) -> Self {
        Wakeup::Playback(id)
    }
}

#[derive(Debug)]
pub struct SimonGame<B: Board> {
    board: B,
    size: BoardSize,
    timing: TimingConfig,
    state: GameState,
    progress: Progress,
    pattern: HostPattern,
    generator: PatternGenerator,
    evaluator: InputEvaluator,
    /// Set while a reset is counting down to the next round.
    waiting_for_host_pattern: bool,
    start_requested: bool,
    pending_transitions: Vec<EventId>,
    scheduler: Scheduler<Wakeup>,
    sequencer: AnimationSequencer,
    transitions: Vec<StateChange>,
    best_level: usize,
}

impl<B: Board> SimonGame<B> {
    /// Creates a game on the start screen with a freshly generated pattern.
    pub fn new(config: &AppConfig, board: B) -> Result<Self> {
        config.validate()?;
        let mut generator = generator_for(config);
        let pattern = generator.generate();
        Ok(Self::assemble(config, board, generator, pattern))
    }

    /// Creates a game whose first pattern is `pattern`. Later resets still
    /// regenerate from the configured generator.
    pub fn with_pattern(config: &AppConfig, board: B, pattern: HostPattern) -> Result<Self> {
        config.validate()?;
        let size = config.board.size();
        if pattern.len() != config.pattern.length {
            return Err(SimonError::Config(format!(
                "pattern has {} entries, pattern.length is {}",
                pattern.len(),
                config.pattern.length
            )));
        }
        for &coordinate in pattern.as_slice() {
            size.check(coordinate)?;
        }
        Ok(Self::assemble(config, board, generator_for(config), pattern))
    }

    fn assemble(
        config: &AppConfig,
        board: B,
        generator: PatternGenerator,
        pattern: HostPattern,
    ) -> Self {
        let size = config.board.size();
        Self {
            board,
            size,
            timing: config.timing.clone(),
            state: GameState::StartScreen,
            progress: Progress::new(),
            pattern,
            generator,
            evaluator: InputEvaluator::new(size),
            waiting_for_host_pattern: false,
            start_requested: false,
            pending_transitions: Vec::new(),
            scheduler: Scheduler::new(),
            sequencer: AnimationSequencer::new(),
            transitions: Vec::new(),
            best_level: 0,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn level(&self) -> usize {
        self.progress.level()
    }

    pub fn tiles_tapped(&self) -> usize {
        self.progress.tiles_tapped()
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Highest level reached since this game was created.
    pub fn best_level(&self) -> usize {
        self.best_level
    }

    pub fn pattern(&self) -> &HostPattern {
        &self.pattern
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn board_size(&self) -> BoardSize {
        self.size
    }

    pub fn is_waiting_for_host_pattern(&self) -> bool {
        self.waiting_for_host_pattern
    }

    /// Virtual time of the last tick.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Earliest pending wakeup, transition or animation.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Deadlines of the pending transitions to `HostPattern`.
    pub fn pending_transitions(&self) -> Vec<Duration> {
        self.pending_transitions
            .iter()
            .filter_map(|&id| self.scheduler.deadline_of(id))
            .collect()
    }

    pub fn is_animating(&self) -> bool {
        !self.sequencer.is_idle()
    }

    /// True when nothing will happen until the player taps.
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_empty() && self.state != GameState::HostPattern
    }

    /// The round has been shown in full and no transition is pending.
    pub fn awaits_input(&self) -> bool {
        self.state == GameState::UserPattern
            && self.sequencer.is_idle()
            && self.pending_transitions.is_empty()
    }

    /// Returns and clears the state changes recorded so far.
    pub fn take_transitions(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.transitions)
    }

    /// Forwarded by the host for every touch-down.
    pub fn on_tap_down(&mut self, point: ScreenPoint) -> Result<TapOutcome> {
        match self.state {
            GameState::StartScreen => Ok(self.start()),
            GameState::UserPattern => match self.board.resolve_touch(point) {
                Some(coordinate) => Ok(self
                    .evaluate_tap(coordinate)?
                    .map_or(TapOutcome::Ignored, TapOutcome::Judged)),
                None => {
                    tracing::warn!(x = point.x, y = point.y, "tap did not hit a tile");
                    Ok(TapOutcome::NoTile)
                }
            },
            GameState::HostPattern | GameState::DeadReset => Ok(TapOutcome::Ignored),
        }
    }

    /// Judges a resolved tap. Outside `UserPattern` this does nothing and
    /// returns `None`.
    pub fn evaluate_tap(&mut self, coordinate: Coordinate) -> Result<Option<Verdict>> {
        if self.state != GameState::UserPattern {
            return Ok(None);
        }

        let verdict = self
            .evaluator
            .evaluate(&mut self.progress, &self.pattern, coordinate)?;
        // Exhaustion is fatal, so it must fail before any feedback is queued.
        if verdict == Verdict::RoundComplete {
            self.progress.advance_round(self.pattern.len())?;
        }
        self.sequencer.play(
            &[coordinate],
            self.timing.tap_step(),
            PlaybackKind::TapFeedback,
            None,
            &mut self.scheduler,
        );

        match verdict {
            Verdict::Continue => {}
            Verdict::RoundComplete => {
                self.best_level = self.best_level.max(self.progress.level());
                tracing::info!(level = self.progress.level(), "round complete");
                self.schedule_host_pattern(self.timing.round_advance());
            }
            Verdict::Mismatch => {
                tracing::info!(level = self.progress.level(), "wrong tile");
                self.cancel_pending_transitions();
                self.set_state(GameState::DeadReset);
            }
        }
        Ok(Some(verdict))
    }

    /// Forwarded by the host once per frame with the current virtual time.
    pub fn on_tick(&mut self, now: Duration) -> Result<()> {
        while let Some(event) = self.scheduler.pop_due(now) {
            match event.payload {
                Wakeup::EnterHostPattern => {
                    self.pending_transitions.retain(|&id| id != event.id);
                    self.set_state(GameState::HostPattern);
                    self.waiting_for_host_pattern = false;
                }
                Wakeup::Playback(id) => {
                    self.sequencer
                        .advance(id, &mut self.board, &mut self.scheduler);
                }
            }
        }
        self.scheduler.advance_to(now);

        match self.state {
            GameState::HostPattern => self.reveal_round(),
            GameState::DeadReset => {
                self.reset_after_failure();
                Ok(())
            }
            GameState::StartScreen | GameState::UserPattern => Ok(()),
        }
    }

    fn start(&mut self) -> TapOutcome {
        if self.start_requested {
            return TapOutcome::Ignored;
        }
        self.start_requested = true;
        tracing::info!("game starting");
        self.flash();
        self.schedule_host_pattern(self.timing.reset());
        TapOutcome::Started
    }

    fn reveal_round(&mut self) -> Result<()> {
        let level = self.progress.level();
        let prefix = self.pattern.prefix(level)?;
        self.progress.start_round();
        self.sequencer.play(
            prefix,
            self.timing.reveal_step(),
            PlaybackKind::Pattern,
            None,
            &mut self.scheduler,
        );
        tracing::info!(level, taps = level + 1, "revealing pattern");
        self.set_state(GameState::UserPattern);
        Ok(())
    }

    /// Runs once per failure no matter how many ticks land in `DeadReset`.
    fn reset_after_failure(&mut self) {
        if self.waiting_for_host_pattern {
            return;
        }
        self.waiting_for_host_pattern = true;

        self.cancel_pending_transitions();
        self.flash();
        self.progress.reset();
        self.generator.regenerate(&mut self.pattern);
        tracing::info!(best_level = self.best_level, "game reset");
        self.schedule_host_pattern(self.timing.reset());
    }

    fn flash(&mut self) {
        let cycle = flash_cycle(self.size, self.timing.flash_revs);
        self.sequencer.play(
            &cycle,
            self.timing.flash_step(),
            PlaybackKind::Flash,
            None,
            &mut self.scheduler,
        );
    }

    /// Drops round advances that were scheduled before a miss.
    fn cancel_pending_transitions(&mut self) {
        for id in self.pending_transitions.drain(..) {
            self.scheduler.cancel(id);
        }
    }

    fn schedule_host_pattern(&mut self, delay: Duration) {
        let id = self.scheduler.schedule(delay, Wakeup::EnterHostPattern);
        self.pending_transitions.push(id);
    }

    fn set_state(&mut self, to: GameState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        let at = self.scheduler.now();
        tracing::info!(%from, %to, at_ms = at.as_millis() as u64, "state change");
        self.transitions.push(StateChange { from, to, at });
    }
}

fn generator_for(config: &AppConfig) -> PatternGenerator {
    let size = config.board.size();
    match config.pattern.seed {
        Some(seed) => PatternGenerator::with_seed(size, config.pattern.length, seed),
        None => PatternGenerator::new(size, config.pattern.length),
    }
}
