use serde::{Deserialize, Serialize};

use imperialism_protocol::{ProvinceId, TerrainId, TilePosition};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: TerrainId,
    #[serde(default)]
    pub province: Option<ProvinceId>,
    #[serde(default)]
    pub prospected: bool,
}

/// Rectangular terrain grid, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMap {
    rows: u32,
    columns: u32,
    tiles: Vec<Tile>,
}

impl GameMap {
    pub fn new(rows: u32, columns: u32, default_terrain: TerrainId) -> Self {
        let tiles = vec![
            Tile {
                terrain: default_terrain,
                province: None,
                prospected: false,
            };
            (rows as usize) * (columns as usize)
        ];
        Self {
            rows,
            columns,
            tiles,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// False when a deserialized map's tile vector does not match its dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.tiles.len() == (self.rows as usize) * (self.columns as usize)
    }

    pub fn contains(&self, position: TilePosition) -> bool {
        position.row >= 0
            && position.column >= 0
            && (position.row as u32) < self.rows
            && (position.column as u32) < self.columns
    }

    pub fn index_of(&self, position: TilePosition) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        let index = (position.row as usize) * (self.columns as usize) + (position.column as usize);
        (index < self.tiles.len()).then_some(index)
    }

    pub fn position_at(&self, index: usize) -> Option<TilePosition> {
        if index >= self.tiles.len() || self.columns == 0 {
            return None;
        }
        let row = (index / self.columns as usize) as i32;
        let column = (index % self.columns as usize) as i32;
        Some(TilePosition::new(row, column))
    }

    /// Clamps arbitrary (possibly negative) coordinates onto the map.
    pub fn clamp(&self, row: i64, column: i64) -> TilePosition {
        let max_row = i64::from(self.rows.saturating_sub(1));
        let max_column = i64::from(self.columns.saturating_sub(1));
        TilePosition::new(row.clamp(0, max_row) as i32, column.clamp(0, max_column) as i32)
    }

    pub fn get(&self, position: TilePosition) -> Option<&Tile> {
        self.index_of(position).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, position: TilePosition) -> Option<&mut Tile> {
        self.index_of(position).map(move |i| &mut self.tiles[i])
    }

    /// Positions and tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TilePosition, &Tile)> {
        let columns = self.columns.max(1) as usize;
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            (
                TilePosition::new((index / columns) as i32, (index % columns) as i32),
                tile,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_through_position() {
        let map = GameMap::new(3, 5, TerrainId::new(0));
        for index in 0..map.len() {
            let position = map.position_at(index).unwrap();
            assert_eq!(map.index_of(position), Some(index));
        }
        assert_eq!(map.position_at(7), Some(TilePosition::new(1, 2)));
    }

    #[test]
    fn out_of_bounds_positions_have_no_tile() {
        let map = GameMap::new(3, 5, TerrainId::new(0));
        assert!(map.get(TilePosition::new(-1, 0)).is_none());
        assert!(map.get(TilePosition::new(3, 0)).is_none());
        assert!(map.get(TilePosition::new(0, 5)).is_none());
        assert!(map.get(TilePosition::new(2, 4)).is_some());
    }

    #[test]
    fn clamp_pins_coordinates_to_edges() {
        let map = GameMap::new(3, 5, TerrainId::new(0));
        assert_eq!(map.clamp(-4, 2), TilePosition::new(0, 2));
        assert_eq!(map.clamp(10, 10), TilePosition::new(2, 4));
    }

    #[test]
    fn iteration_is_row_major() {
        let map = GameMap::new(2, 2, TerrainId::new(0));
        let order: Vec<_> = map.iter().map(|(p, _)| p).collect();
        assert_eq!(
            order,
            vec![
                TilePosition::new(0, 0),
                TilePosition::new(0, 1),
                TilePosition::new(1, 0),
                TilePosition::new(1, 1),
            ]
        );
    }
}
