use alloc::vec::Vec;
use ndarray::Array2;
use rand::{Rng, RngExt};
use serde::{Deserialize, Serialize};

use crate::*;

/// Coarse lifecycle of the board, derived from placement and reveal state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    NoMarkers,
    PlayerPlaced,
    BothPlaced,
    InPlay,
    Resolved(Side),
}

impl EngineState {
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    Revealed,
    /// The revealed cell held the other side's marker; the revealer wins.
    FoundMarker(Side),
}

impl RevealOutcome {
    pub const fn found(self) -> bool {
        matches!(self, Self::FoundMarker(_))
    }
}

/// Board state and rules: placement legality, reveal legality, victory
/// detection, and the 1-indexed grid numbering used by hints and targeting.
///
/// The engine does not gate reveals on whose turn it is; sequencing external
/// events is the match controller's job. It does flip `turn_owner` on every
/// successful reveal until a victor is decided.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridEngine {
    cells: Array2<Cell>,
    player_marker_placed: bool,
    opponent_marker_placed: bool,
    turn_owner: Side,
    victor: Option<Side>,
    revealed_count: CellCount,
}

impl GridEngine {
    pub fn new(width: Coord, height: Coord) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            cells: Array2::default((width, height).to_nd_index()),
            player_marker_placed: false,
            opponent_marker_placed: false,
            turn_owner: Side::Player,
            victor: None,
            revealed_count: 0,
        }
    }

    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let dim = difficulty.grid_dimension();
        Self::new(dim, dim)
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        let (width, height) = self.size();
        mult(width, height)
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    pub fn turn_owner(&self) -> Side {
        self.turn_owner
    }

    pub fn victor(&self) -> Option<Side> {
        self.victor
    }

    pub fn marker_placed(&self, side: Side) -> bool {
        match side {
            Side::Player => self.player_marker_placed,
            Side::Opponent => self.opponent_marker_placed,
        }
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn state(&self) -> EngineState {
        if let Some(victor) = self.victor {
            return EngineState::Resolved(victor);
        }
        if self.revealed_count > 0 {
            return EngineState::InPlay;
        }
        match (self.player_marker_placed, self.opponent_marker_placed) {
            (false, false) => EngineState::NoMarkers,
            (true, true) => EngineState::BothPlaced,
            _ => EngineState::PlayerPlaced,
        }
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// 1-indexed row-major grid number for the given coordinates.
    pub fn coords_to_index(&self, coords: Coord2) -> Result<GridIndex> {
        let (col, row) = self.validate_coords(coords)?;
        let width = self.width() as GridIndex;
        Ok(row as GridIndex * width + col as GridIndex + 1)
    }

    /// Inverse of [`coords_to_index`](Self::coords_to_index) over
    /// `[1, width * height]`.
    pub fn index_to_coords(&self, index: GridIndex) -> Result<Coord2> {
        if index == 0 || index > self.total_cells() {
            return Err(GameError::InvalidCoords);
        }
        let zero_based = index - 1;
        let width = self.width() as GridIndex;
        let col = (zero_based % width) as Coord;
        let row = (zero_based / width) as Coord;
        Ok((col, row))
    }

    /// Hides `side`'s marker at `coords`. Each side places exactly once per
    /// match, and never on top of the other marker.
    pub fn place_marker(&mut self, coords: Coord2, side: Side) -> Result<GridIndex> {
        let coords = self.validate_coords(coords)?;
        if self.marker_placed(side) {
            return Err(GameError::MarkerAlreadyPlaced);
        }
        if !self.cells[coords.to_nd_index()].occupant.is_empty() {
            return Err(GameError::CellOccupied);
        }

        self.cells[coords.to_nd_index()].occupant = Occupant::marker_of(side);
        match side {
            Side::Player => self.player_marker_placed = true,
            Side::Opponent => self.opponent_marker_placed = true,
        }
        let index = self.coords_to_index(coords)?;
        log::debug!("{side:?} marker placed at grid {index}");
        Ok(index)
    }

    /// Hides the opponent marker uniformly at random among unoccupied cells.
    ///
    /// Drawing only from unoccupied cells makes a collision with the player
    /// marker impossible by construction. A no-op returning the existing
    /// location if the opponent has already placed.
    pub fn place_opponent_marker_randomly<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<GridIndex> {
        if self.opponent_marker_placed {
            return self
                .marker_location(Side::Opponent)
                .ok_or(GameError::MarkerNotPlaced);
        }

        let free: Vec<Coord2> = self
            .cells
            .indexed_iter()
            .filter(|(_, cell)| cell.occupant.is_empty())
            .map(|((col, row), _)| (col as Coord, row as Coord))
            .collect();
        if free.is_empty() {
            return Err(GameError::NoCellAvailable);
        }

        let coords = free[rng.random_range(0..free.len())];
        self.place_marker(coords, Side::Opponent)
    }

    /// Uncovers a cell on behalf of `by`.
    ///
    /// A side may not reveal the cell hiding its own marker; a marker must be
    /// found by the opposing side. Revealing the other side's marker decides
    /// the match, and once a victor is set every further reveal is rejected,
    /// so the victor can never change.
    pub fn reveal(&mut self, coords: Coord2, by: Side) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        if self.victor.is_some() {
            return Err(GameError::MatchResolved);
        }
        let cell = self.cells[coords.to_nd_index()];
        if cell.is_revealed() {
            return Err(GameError::AlreadyRevealed);
        }
        if cell.occupant.owner() == Some(by) {
            return Err(GameError::OwnMarker);
        }

        self.cells[coords.to_nd_index()].revealed_by = Some(by);
        self.revealed_count += 1;

        if cell.occupant.owner().is_some() {
            // own-marker reveals were rejected above, so this is the find
            self.victor = Some(by);
            log::info!("{by:?} found the hidden marker, match resolved");
            return Ok(RevealOutcome::FoundMarker(by));
        }

        self.turn_owner = by.opposite();
        Ok(RevealOutcome::Revealed)
    }

    /// Ascending grid indices of all cells still hidden.
    pub fn unrevealed_indices(&self) -> Vec<GridIndex> {
        let (width, height) = self.size();
        let mut indices = Vec::new();
        for row in 0..height {
            for col in 0..width {
                if !self.cells[(col, row).to_nd_index()].is_revealed() {
                    // in-bounds by construction
                    indices.push(self.coords_to_index((col, row)).unwrap());
                }
            }
        }
        indices
    }

    /// Grid index hiding `side`'s marker, if placed. Linear scan; grids are
    /// at most 20x20 and this is only called around placement and hints.
    pub fn marker_location(&self, side: Side) -> Option<GridIndex> {
        let (width, height) = self.size();
        for row in 0..height {
            for col in 0..width {
                if self.cells[(col, row).to_nd_index()].occupant.owner() == Some(side) {
                    return self.coords_to_index((col, row)).ok();
                }
            }
        }
        None
    }

    /// Back to an empty, fully hidden board with the player to move first.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::default());
        self.player_marker_placed = false;
        self.opponent_marker_placed = false;
        self.turn_owner = Side::Player;
        self.victor = None;
        self.revealed_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng as _;
    use rand::rngs::SmallRng;

    #[test]
    fn grid_index_round_trips_both_ways() {
        let engine = GridEngine::new(5, 4);
        for index in 1..=engine.total_cells() {
            let coords = engine.index_to_coords(index).unwrap();
            assert_eq!(engine.coords_to_index(coords).unwrap(), index);
        }
        for row in 0..4 {
            for col in 0..5 {
                let index = engine.coords_to_index((col, row)).unwrap();
                assert_eq!(engine.index_to_coords(index).unwrap(), (col, row));
            }
        }
    }

    #[test]
    fn grid_numbering_is_row_major_and_one_indexed() {
        let engine = GridEngine::new(5, 5);
        assert_eq!(engine.coords_to_index((0, 0)).unwrap(), 1);
        assert_eq!(engine.coords_to_index((4, 0)).unwrap(), 5);
        assert_eq!(engine.coords_to_index((0, 1)).unwrap(), 6);
        assert_eq!(engine.coords_to_index((4, 4)).unwrap(), 25);
    }

    #[test]
    fn index_bounds_are_rejected() {
        let engine = GridEngine::new(5, 5);
        assert_eq!(engine.index_to_coords(0), Err(GameError::InvalidCoords));
        assert_eq!(engine.index_to_coords(26), Err(GameError::InvalidCoords));
        assert_eq!(
            engine.coords_to_index((5, 0)),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn each_side_places_exactly_once() {
        let mut engine = GridEngine::new(5, 5);
        engine.place_marker((1, 1), Side::Player).unwrap();
        assert_eq!(
            engine.place_marker((2, 2), Side::Player),
            Err(GameError::MarkerAlreadyPlaced)
        );
        assert_eq!(
            engine.place_marker((1, 1), Side::Opponent),
            Err(GameError::CellOccupied)
        );
        engine.place_marker((2, 2), Side::Opponent).unwrap();
        assert_eq!(engine.state(), EngineState::BothPlaced);
    }

    #[test]
    fn random_opponent_placement_never_hits_player_marker() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let mut engine = GridEngine::new(5, 5);
            let coords = engine.index_to_coords(7).unwrap();
            engine.place_marker(coords, Side::Player).unwrap();
            let placed = engine.place_opponent_marker_randomly(&mut rng).unwrap();
            assert_ne!(placed, 7);
        }
    }

    #[test]
    fn random_opponent_placement_takes_the_only_free_cell() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut engine = GridEngine::new(2, 1);
        engine.place_marker((0, 0), Side::Player).unwrap();
        let placed = engine.place_opponent_marker_randomly(&mut rng).unwrap();
        assert_eq!(placed, 2);
    }

    #[test]
    fn random_opponent_placement_is_a_noop_when_already_placed() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut engine = GridEngine::new(5, 5);
        engine.place_marker((0, 0), Side::Opponent).unwrap();
        let placed = engine.place_opponent_marker_randomly(&mut rng).unwrap();
        assert_eq!(Some(placed), engine.marker_location(Side::Opponent));
        assert_eq!(placed, 1);
    }

    #[test]
    fn self_reveal_is_rejected_and_leaves_the_cell_hidden() {
        let mut engine = GridEngine::new(5, 5);
        engine.place_marker((2, 2), Side::Player).unwrap();
        assert_eq!(
            engine.reveal((2, 2), Side::Player),
            Err(GameError::OwnMarker)
        );
        assert!(!engine.cell_at((2, 2)).is_revealed());
        assert_eq!(engine.victor(), None);
    }

    #[test]
    fn revealing_the_other_sides_marker_decides_the_match() {
        let mut engine = GridEngine::new(5, 5);
        engine.place_marker((1, 1), Side::Player).unwrap();
        engine.place_marker((3, 3), Side::Opponent).unwrap();

        let outcome = engine.reveal((3, 3), Side::Player).unwrap();

        assert_eq!(outcome, RevealOutcome::FoundMarker(Side::Player));
        assert_eq!(engine.victor(), Some(Side::Player));
        assert_eq!(engine.state(), EngineState::Resolved(Side::Player));
    }

    #[test]
    fn victor_never_changes_once_set() {
        let mut engine = GridEngine::new(5, 5);
        engine.place_marker((1, 1), Side::Player).unwrap();
        engine.place_marker((3, 3), Side::Opponent).unwrap();
        engine.reveal((3, 3), Side::Player).unwrap();

        assert_eq!(
            engine.reveal((1, 1), Side::Opponent),
            Err(GameError::MatchResolved)
        );
        assert_eq!(engine.reveal((0, 0), Side::Player), Err(GameError::MatchResolved));
        assert_eq!(engine.victor(), Some(Side::Player));
    }

    #[test]
    fn successful_reveals_alternate_the_turn_owner() {
        let mut engine = GridEngine::new(5, 5);
        assert_eq!(engine.turn_owner(), Side::Player);
        engine.reveal((0, 0), Side::Player).unwrap();
        assert_eq!(engine.turn_owner(), Side::Opponent);
        engine.reveal((1, 0), Side::Opponent).unwrap();
        assert_eq!(engine.turn_owner(), Side::Player);
    }

    #[test]
    fn double_reveal_is_rejected() {
        let mut engine = GridEngine::new(5, 5);
        engine.reveal((0, 0), Side::Player).unwrap();
        assert_eq!(
            engine.reveal((0, 0), Side::Opponent),
            Err(GameError::AlreadyRevealed)
        );
    }

    #[test]
    fn unrevealed_indices_are_ascending_and_shrink() {
        let mut engine = GridEngine::new(3, 3);
        assert_eq!(engine.unrevealed_indices().len(), 9);
        engine.reveal((1, 0), Side::Player).unwrap();
        let indices = engine.unrevealed_indices();
        assert_eq!(indices.len(), 8);
        assert!(!indices.contains(&2));
        assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn reset_returns_to_the_initial_state() {
        let mut engine = GridEngine::new(5, 5);
        engine.place_marker((1, 1), Side::Player).unwrap();
        engine.place_marker((3, 3), Side::Opponent).unwrap();
        engine.reveal((3, 3), Side::Player).unwrap();

        engine.reset();

        assert_eq!(engine.state(), EngineState::NoMarkers);
        assert_eq!(engine.victor(), None);
        assert_eq!(engine.turn_owner(), Side::Player);
        assert_eq!(engine.unrevealed_indices().len(), 25);
        assert_eq!(engine.marker_location(Side::Player), None);
    }

    #[test]
    fn engine_state_round_trips_through_serde() {
        let mut engine = GridEngine::new(5, 5);
        engine.place_marker((1, 1), Side::Player).unwrap();
        engine.reveal((0, 0), Side::Player).unwrap();

        let json = serde_json::to_string(&engine).unwrap();
        let restored: GridEngine = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, engine);
    }
}
