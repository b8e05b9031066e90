#![no_std]

extern crate alloc;

use core::time::Duration;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use controller::*;
pub use engine::*;
pub use error::*;
pub use observation::*;
pub use policy::*;
pub use types::*;

mod cell;
mod controller;
mod engine;
mod error;
mod observation;
mod policy;
mod types;

/// Difficulty presets: square grid dimension, plus the time and attempt
/// budgets used by the time-attack mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const fn grid_dimension(self) -> Coord {
        match self {
            Self::Easy => 5,
            Self::Medium => 10,
            Self::Hard => 20,
        }
    }

    pub const fn time_budget(self) -> Duration {
        match self {
            Self::Easy => Duration::from_secs(30),
            Self::Medium => Duration::from_secs(40),
            Self::Hard => Duration::from_secs(50),
        }
    }

    pub const fn attempt_budget(self) -> CellCount {
        match self {
            Self::Easy => 5,
            Self::Medium => 4,
            Self::Hard => 3,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Play until somebody's marker is found.
    Classic,
    /// The player additionally races a clock and an attempt budget.
    TimeAttack,
}

/// Per-match rule choices, fixed at controller construction.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRules {
    pub mode: GameMode,
    /// Whether the pre-play hint dialog happens at all.
    pub hint_exchange: bool,
    /// Fixed opponent personality; `None` draws one at random per match.
    pub personality: Option<Personality>,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            mode: GameMode::Classic,
            hint_exchange: true,
            personality: None,
        }
    }
}
