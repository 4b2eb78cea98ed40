//! Rule engine for a Simon-style memory game.
//!
//! The engine generates a pool of random tile coordinates, reveals a growing
//! prefix of it each round, and judges the player's taps. Drawing, sound and
//! touch hit-testing belong to a [`Board`] collaborator; the host forwards
//! taps and frame ticks to [`SimonGame`].
//!
//! Each module owns one part of the engine: pattern generation, the delayed
//! action scheduler, the animation sequencer, tap evaluation and the state
//! machine that ties them together.

pub mod animation;
pub mod board;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod game;
pub mod pattern;
pub mod render;
pub mod timeline;

pub use animation::{AnimationSequencer, OnComplete, PlaybackFinished, PlaybackId, PlaybackKind};
pub use board::{Board, BoardSize, Cell, Coordinate, GridLayout, Rgb, ScreenPoint, TileColor};
pub use config::{AppConfig, BoardConfig, PatternConfig, TimingConfig};
pub use error::{Result, SimonError};
pub use evaluator::{InputEvaluator, Progress, Verdict};
pub use game::{GameState, SimonGame, StateChange, TapOutcome};
pub use pattern::{HostPattern, PatternGenerator};
pub use render::{BoardEvent, RecordingBoard};
pub use timeline::{Clock, EventId, ScheduledEvent, Scheduler};
