/// Single coordinate axis used for grid width, height, and positions.
pub type Coord = u8;

/// Count type used for cell totals and attempt counters.
pub type CellCount = u16;

/// Two-dimensional coordinates `(col, row)`.
pub type Coord2 = (Coord, Coord);

/// 1-indexed row-major cell identifier: `index = row * width + col + 1`.
///
/// This is the externally visible cell name used for hints, chat references
/// and opponent targeting.
pub type GridIndex = u16;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}
