use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Read-only board snapshot for display layers: who revealed each cell, and
/// marker owners only where the hiding cell has been uncovered. Hidden
/// markers never leak through an observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub size: Coord2,
    pub revealed_by: Array2<Option<Side>>,
    pub visible_markers: Array2<Option<Side>>,
}

impl Observation {
    pub fn from_engine(engine: &GridEngine) -> Self {
        let size = engine.size();
        let mut revealed_by = Array2::from_elem(size.to_nd_index(), None);
        let mut visible_markers = Array2::from_elem(size.to_nd_index(), None);

        let (cols, rows) = size;
        for col in 0..cols {
            for row in 0..rows {
                let coords = (col, row);
                let cell = engine.cell_at(coords);
                revealed_by[coords.to_nd_index()] = cell.revealed_by;
                if cell.is_revealed() {
                    visible_markers[coords.to_nd_index()] = cell.occupant.owner();
                }
            }
        }

        Self {
            size,
            revealed_by,
            visible_markers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_shows_reveals_but_hides_unfound_markers() {
        let mut engine = GridEngine::new(3, 3);
        engine.place_marker((2, 2), Side::Player).unwrap();
        engine.place_marker((0, 2), Side::Opponent).unwrap();
        engine.reveal((0, 0), Side::Player).unwrap();
        engine.reveal((1, 0), Side::Opponent).unwrap();

        let obs = Observation::from_engine(&engine);

        assert_eq!(obs.size, (3, 3));
        assert_eq!(obs.revealed_by[(0, 0)], Some(Side::Player));
        assert_eq!(obs.revealed_by[(1, 0)], Some(Side::Opponent));
        assert_eq!(obs.revealed_by[(2, 2)], None);
        // both markers are still hidden
        assert_eq!(obs.visible_markers[(2, 2)], None);
        assert_eq!(obs.visible_markers[(0, 2)], None);
    }

    #[test]
    fn found_marker_becomes_visible() {
        let mut engine = GridEngine::new(3, 3);
        engine.place_marker((2, 2), Side::Player).unwrap();
        engine.reveal((2, 2), Side::Opponent).unwrap();

        let obs = Observation::from_engine(&engine);

        assert_eq!(obs.revealed_by[(2, 2)], Some(Side::Opponent));
        assert_eq!(obs.visible_markers[(2, 2)], Some(Side::Player));
    }
}
