use serde::{Deserialize, Serialize};

/// Identity of one of the two parties in a match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }
}

/// Marker stored in a cell; each side hides at most one per match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    Empty,
    PlayerMarker,
    OpponentMarker,
}

impl Occupant {
    pub const fn marker_of(side: Side) -> Self {
        match side {
            Side::Player => Self::PlayerMarker,
            Side::Opponent => Self::OpponentMarker,
        }
    }

    pub const fn owner(self) -> Option<Side> {
        match self {
            Self::Empty => None,
            Self::PlayerMarker => Some(Side::Player),
            Self::OpponentMarker => Some(Side::Opponent),
        }
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl Default for Occupant {
    fn default() -> Self {
        Self::Empty
    }
}

/// Single grid cell: occupancy plus one-way reveal state.
///
/// `revealed_by` doubles as the reveal flag, so a revealer is recorded exactly
/// when a cell is revealed and the pair can never disagree. Both fields are
/// written at most once per match and never revert.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub occupant: Occupant,
    pub revealed_by: Option<Side>,
}

impl Cell {
    pub const fn is_revealed(self) -> bool {
        self.revealed_by.is_some()
    }
}
