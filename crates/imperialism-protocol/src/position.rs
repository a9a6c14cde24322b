use std::fmt;

use serde::{Deserialize, Serialize};

/// A tile on the rectangular scenario map, addressed by row then column.
///
/// Ordering is row-major, which is also the order used whenever positions are
/// iterated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePosition {
    pub row: i32,
    pub column: i32,
}

impl TilePosition {
    /// The eight neighbouring offsets, clockwise from north.
    pub const DIRECTIONS: [(i32, i32); 8] = [
        (-1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
        (1, 0),
        (1, -1),
        (0, -1),
        (-1, -1),
    ];

    #[inline]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    pub fn neighbors(self) -> impl Iterator<Item = TilePosition> {
        Self::DIRECTIONS
            .into_iter()
            .map(move |(dr, dc)| TilePosition::new(self.row + dr, self.column + dc))
    }

    /// Chebyshev distance: diagonal steps cost the same as straight ones.
    #[inline]
    pub fn distance(self, other: TilePosition) -> i32 {
        (self.row - other.row)
            .abs()
            .max((self.column - other.column).abs())
    }

    #[inline]
    pub fn is_adjacent(self, other: TilePosition) -> bool {
        self.distance(other) == 1
    }
}

impl fmt::Display for TilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// A road between two adjacent tiles. Endpoints are stored in ascending order
/// so `(a, b)` and `(b, a)` name the same segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoadSegment {
    from: TilePosition,
    to: TilePosition,
}

impl RoadSegment {
    pub fn new(a: TilePosition, b: TilePosition) -> Self {
        if a <= b {
            Self { from: a, to: b }
        } else {
            Self { from: b, to: a }
        }
    }

    pub fn from(&self) -> TilePosition {
        self.from
    }

    pub fn to(&self) -> TilePosition {
        self.to
    }

    pub fn touches(&self, position: TilePosition) -> bool {
        self.from == position || self.to == position
    }
}
