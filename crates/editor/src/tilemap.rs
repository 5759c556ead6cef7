use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::camera::TileCoord;
use crate::layers::LayerId;

/// Tile index of a cell with nothing painted on it.
pub const EMPTY_TILE: i32 = -1;

/// Row-major grid of tile indices.
///
/// `origin` is the tile coordinate of cell (0,0); every coordinate handed to
/// the grid is in tile space and is shifted by `origin` before indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    origin: TileCoord,
    tiles: Vec<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
}

impl TileGrid {
    pub fn new(width: u32, height: u32, origin: TileCoord) -> Self {
        Self {
            width,
            height,
            origin,
            tiles: vec![EMPTY_TILE; width as usize * height as usize],
        }
    }

    pub fn from_tiles(
        width: u32,
        height: u32,
        origin: TileCoord,
        tiles: Vec<i32>,
    ) -> Result<Self, TilemapError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            origin,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn origin(&self) -> TileCoord {
        self.origin
    }

    pub fn tiles(&self) -> &[i32] {
        &self.tiles
    }

    pub fn index_of(&self, tile: TileCoord) -> Option<usize> {
        let local_x = i64::from(tile.x) - i64::from(self.origin.x);
        let local_y = i64::from(tile.y) - i64::from(self.origin.y);
        if local_x < 0
            || local_y < 0
            || local_x >= i64::from(self.width)
            || local_y >= i64::from(self.height)
        {
            return None;
        }
        Some(local_y as usize * self.width as usize + local_x as usize)
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        self.index_of(tile).is_some()
    }

    pub fn get(&self, tile: TileCoord) -> i32 {
        self.index_of(tile)
            .and_then(|index| self.tiles.get(index).copied())
            .unwrap_or(EMPTY_TILE)
    }

    pub fn set(&mut self, tile: TileCoord, value: i32) -> bool {
        let Some(cell) = self.index_of(tile).and_then(|index| self.tiles.get_mut(index)) else {
            return false;
        };
        if *cell == value {
            return false;
        }
        *cell = value;
        true
    }

    /// 4-connected flood fill from `seed`, returning the number of cells changed.
    pub fn fill(&mut self, seed: TileCoord, value: i32) -> usize {
        let Some(seed_index) = self.index_of(seed) else {
            return 0;
        };
        let seed_value = self.tiles[seed_index];
        if seed_value == value {
            return 0;
        }

        let width = self.width as usize;
        let height = self.height as usize;
        let mut visited = vec![false; self.tiles.len()];
        let mut frontier = vec![seed_index];
        visited[seed_index] = true;
        let mut changed = 0usize;

        while let Some(index) = frontier.pop() {
            self.tiles[index] = value;
            changed += 1;

            let x = index % width;
            let y = index / width;
            let neighbors = [
                (x > 0).then(|| index - 1),
                (x + 1 < width).then(|| index + 1),
                (y > 0).then(|| index - width),
                (y + 1 < height).then(|| index + width),
            ];
            for neighbor in neighbors.into_iter().flatten() {
                if !visited[neighbor] && self.tiles[neighbor] == seed_value {
                    visited[neighbor] = true;
                    frontier.push(neighbor);
                }
            }
        }

        changed
    }

    pub fn rows(&self) -> impl Iterator<Item = &[i32]> + '_ {
        self.tiles.chunks(self.width.max(1) as usize)
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 0 {
            return Ok(());
        }
        for row in self.rows() {
            let mut first = true;
            for value in row {
                if !first {
                    write!(f, ",")?;
                }
                write!(f, "{value}")?;
                first = false;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One tile grid per layer id.
#[derive(Debug, Clone, Default)]
pub struct TilemapStore {
    grids: BTreeMap<LayerId, TileGrid>,
}

impl TilemapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any grid already stored under `layer`.
    pub fn create_layer(&mut self, layer: LayerId, width: u32, height: u32, origin: TileCoord) {
        self.grids.insert(layer, TileGrid::new(width, height, origin));
    }

    pub fn insert_grid(&mut self, layer: LayerId, grid: TileGrid) {
        self.grids.insert(layer, grid);
    }

    pub fn remove_layer(&mut self, layer: LayerId) -> Option<TileGrid> {
        self.grids.remove(&layer)
    }

    pub fn grid(&self, layer: LayerId) -> Option<&TileGrid> {
        self.grids.get(&layer)
    }

    pub fn contains_layer(&self, layer: LayerId) -> bool {
        self.grids.contains_key(&layer)
    }

    pub fn layer_count(&self) -> usize {
        self.grids.len()
    }

    pub fn get(&self, x: i32, y: i32, layer: LayerId) -> i32 {
        self.grids
            .get(&layer)
            .map_or(EMPTY_TILE, |grid| grid.get(TileCoord { x, y }))
    }

    /// Writes one cell; `EMPTY_TILE` clears it. Returns whether the cell changed.
    pub fn set(&mut self, x: i32, y: i32, value: i32, layer: LayerId) -> bool {
        self.grids
            .get_mut(&layer)
            .is_some_and(|grid| grid.set(TileCoord { x, y }, value))
    }

    pub fn fill(&mut self, x: i32, y: i32, value: i32, layer: LayerId) -> usize {
        self.grids
            .get_mut(&layer)
            .map_or(0, |grid| grid.fill(TileCoord { x, y }, value))
    }

    pub fn layer_width(&self, layer: LayerId) -> Option<u32> {
        self.grids.get(&layer).map(TileGrid::width)
    }

    pub fn layer_height(&self, layer: LayerId) -> Option<u32> {
        self.grids.get(&layer).map(TileGrid::height)
    }

    pub fn layer_origin(&self, layer: LayerId) -> Option<TileCoord> {
        self.grids.get(&layer).map(TileGrid::origin)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const LAYER: LayerId = LayerId(0);

    fn grid_from_rows(rows: &[&[i32]]) -> TileGrid {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |row| row.len()) as u32;
        let tiles = rows.iter().flat_map(|row| row.iter().copied()).collect();
        TileGrid::from_tiles(width, height, TileCoord::default(), tiles).expect("grid")
    }

    fn reachable_region(grid: &TileGrid, seed: TileCoord) -> HashSet<(i32, i32)> {
        let seed_value = grid.get(seed);
        let mut region = HashSet::new();
        let mut pending = vec![(seed.x, seed.y)];
        while let Some((x, y)) = pending.pop() {
            let tile = TileCoord { x, y };
            if !grid.contains(tile) || grid.get(tile) != seed_value || !region.insert((x, y)) {
                continue;
            }
            pending.extend([(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]);
        }
        region
    }

    #[test]
    fn from_tiles_rejects_wrong_count() {
        let error = TileGrid::from_tiles(2, 2, TileCoord::default(), vec![0; 3]).unwrap_err();
        assert_eq!(
            error,
            TilemapError::TileCountMismatch {
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn unset_and_out_of_bounds_reads_are_empty() {
        let mut store = TilemapStore::new();
        store.create_layer(LAYER, 4, 3, TileCoord::default());
        assert_eq!(store.get(1, 1, LAYER), EMPTY_TILE);
        assert_eq!(store.get(-1, 0, LAYER), EMPTY_TILE);
        assert_eq!(store.get(4, 0, LAYER), EMPTY_TILE);
        assert_eq!(store.get(0, 3, LAYER), EMPTY_TILE);
        assert_eq!(store.get(0, 0, LayerId(9)), EMPTY_TILE);
    }

    #[test]
    fn set_writes_and_clears_cells() {
        let mut store = TilemapStore::new();
        store.create_layer(LAYER, 4, 3, TileCoord::default());
        assert!(store.set(2, 1, 7, LAYER));
        assert_eq!(store.get(2, 1, LAYER), 7);
        assert!(!store.set(2, 1, 7, LAYER));
        assert!(store.set(2, 1, EMPTY_TILE, LAYER));
        assert_eq!(store.get(2, 1, LAYER), EMPTY_TILE);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut store = TilemapStore::new();
        store.create_layer(LAYER, 2, 2, TileCoord::default());
        let before = store.grid(LAYER).cloned();
        assert!(!store.set(2, 0, 5, LAYER));
        assert!(!store.set(0, -1, 5, LAYER));
        assert!(!store.set(i32::MAX, i32::MIN, 5, LAYER));
        assert!(!store.set(0, 0, 5, LayerId(3)));
        assert_eq!(store.grid(LAYER).cloned(), before);
    }

    #[test]
    fn origin_shifts_addressing() {
        let mut grid = TileGrid::new(3, 3, TileCoord::new(-1, -1));
        assert!(grid.set(TileCoord::new(-1, -1), 4));
        assert_eq!(grid.tiles()[0], 4);
        assert!(!grid.set(TileCoord::new(2, 0), 4));
        assert_eq!(grid.get(TileCoord::new(1, 1)), EMPTY_TILE);
    }

    #[test]
    fn fill_replaces_exactly_the_connected_region() {
        let mut grid = grid_from_rows(&[
            &[1, 1, 2, 1],
            &[1, 2, 2, 1],
            &[1, 1, 2, 1],
            &[2, 1, 1, 1],
        ]);
        let seed = TileCoord::new(0, 0);
        let region = reachable_region(&grid, seed);
        let before = grid.clone();

        let changed = grid.fill(seed, 9);
        assert_eq!(changed, region.len());

        for y in 0..4 {
            for x in 0..4 {
                let tile = TileCoord::new(x, y);
                if region.contains(&(x, y)) {
                    assert_eq!(grid.get(tile), 9, "x={x} y={y}");
                } else {
                    assert_eq!(grid.get(tile), before.get(tile), "x={x} y={y}");
                }
            }
        }
        assert_eq!(grid.get(TileCoord::new(0, 3)), 2);
    }

    #[test]
    fn fill_does_not_cross_diagonals() {
        let mut grid = grid_from_rows(&[&[0, 5], &[5, 0]]);
        assert_eq!(grid.fill(TileCoord::new(0, 0), 3), 1);
        assert_eq!(grid.tiles(), &[3, 5, 5, 0]);
    }

    #[test]
    fn fill_with_seed_value_is_a_no_op() {
        let mut grid = grid_from_rows(&[&[4, 4], &[4, 1]]);
        let before = grid.clone();
        assert_eq!(grid.fill(TileCoord::new(0, 0), 4), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn fill_empty_layer_covers_every_cell() {
        let mut store = TilemapStore::new();
        store.create_layer(LAYER, 64, 48, TileCoord::default());
        assert_eq!(store.fill(10, 10, 2, LAYER), 64 * 48);
        assert!(store
            .grid(LAYER)
            .expect("grid")
            .tiles()
            .iter()
            .all(|value| *value == 2));
    }

    #[test]
    fn fill_outside_layer_is_a_no_op() {
        let mut store = TilemapStore::new();
        store.create_layer(LAYER, 2, 2, TileCoord::default());
        assert_eq!(store.fill(5, 5, 1, LAYER), 0);
        assert_eq!(store.fill(0, 0, 1, LayerId(42)), 0);
    }

    #[test]
    fn remove_layer_discards_grid() {
        let mut store = TilemapStore::new();
        store.create_layer(LAYER, 2, 2, TileCoord::default());
        store.set(0, 0, 1, LAYER);
        assert!(store.remove_layer(LAYER).is_some());
        assert_eq!(store.get(0, 0, LAYER), EMPTY_TILE);
        assert_eq!(store.layer_width(LAYER), None);
    }

    #[test]
    fn display_writes_comma_separated_rows() {
        let grid = grid_from_rows(&[&[0, -1, 2], &[3, 4, 5]]);
        assert_eq!(grid.to_string(), "0,-1,2\n3,4,5\n");
    }

    #[test]
    fn layer_dimension_queries() {
        let mut store = TilemapStore::new();
        store.create_layer(LAYER, 7, 5, TileCoord::new(2, -3));
        assert_eq!(store.layer_width(LAYER), Some(7));
        assert_eq!(store.layer_height(LAYER), Some(5));
        assert_eq!(store.layer_origin(LAYER), Some(TileCoord::new(2, -3)));
    }
}
