use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("This side has already placed its marker")]
    MarkerAlreadyPlaced,
    #[error("Target cell already holds a marker")]
    CellOccupied,
    #[error("Cell already revealed")]
    AlreadyRevealed,
    #[error("A marker cannot be revealed by its own side")]
    OwnMarker,
    #[error("Opponent marker is not placed yet")]
    MarkerNotPlaced,
    #[error("Match already resolved, no new moves are accepted")]
    MatchResolved,
    #[error("Event not accepted in the current phase")]
    WrongPhase,
    #[error("No unoccupied cell is available")]
    NoCellAvailable,
}

pub type Result<T> = core::result::Result<T, GameError>;
