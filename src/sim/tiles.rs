//! Static tile grid
//!
//! Each collidable tile is one fixed-size obstacle rectangle. The grid is
//! read-only while a tick resolves movement.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::error::GridError;

/// Grid coordinates of a tile (column, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub col: u32,
    pub row: u32,
}

/// What a single tile is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Floor,
    Wall,
}

impl Tile {
    #[inline]
    pub fn is_collidable(self) -> bool {
        matches!(self, Tile::Wall)
    }
}

/// A rectangular level made of square tiles, stored row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    cols: u32,
    rows: u32,
    tile_size: f32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// An open floor of `cols` x `rows` tiles
    pub fn new(cols: u32, rows: u32, tile_size: f32) -> Self {
        Self {
            cols,
            rows,
            tile_size,
            tiles: vec![Tile::Floor; cols as usize * rows as usize],
        }
    }

    /// An open room enclosed by a one-tile wall ring
    pub fn bordered(cols: u32, rows: u32, tile_size: f32) -> Self {
        let mut grid = Self::new(cols, rows, tile_size);
        for row in 0..rows {
            for col in 0..cols {
                if row == 0 || col == 0 || row + 1 == rows || col + 1 == cols {
                    let idx = grid.index(col, row);
                    grid.tiles[idx] = Tile::Wall;
                }
            }
        }
        grid
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Level extent in pixels
    pub fn bounds(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.cols as f32 * self.tile_size,
            self.rows as f32 * self.tile_size,
        )
    }

    #[inline]
    fn index(&self, col: u32, row: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    fn checked(&self, col: i32, row: i32) -> Result<TileCoord, GridError> {
        if col < 0 || row < 0 || col as u32 >= self.cols || row as u32 >= self.rows {
            return Err(GridError::OutOfBounds {
                col,
                row,
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(TileCoord {
            col: col as u32,
            row: row as u32,
        })
    }

    pub fn tile(&self, col: i32, row: i32) -> Result<Tile, GridError> {
        let c = self.checked(col, row)?;
        Ok(self.tiles[self.index(c.col, c.row)])
    }

    pub fn set_tile(&mut self, col: i32, row: i32, tile: Tile) -> Result<(), GridError> {
        let c = self.checked(col, row)?;
        let idx = self.index(c.col, c.row);
        self.tiles[idx] = tile;
        Ok(())
    }

    /// Mark a tile as wall (`true`) or floor (`false`)
    pub fn set_collidable(&mut self, col: i32, row: i32, collidable: bool) -> Result<(), GridError> {
        let tile = if collidable { Tile::Wall } else { Tile::Floor };
        self.set_tile(col, row, tile)
    }

    pub fn is_collidable(&self, col: i32, row: i32) -> Result<bool, GridError> {
        Ok(self.tile(col, row)?.is_collidable())
    }

    /// Pixel rectangle covered by a tile
    pub fn tile_rect(&self, coord: TileCoord) -> Rect {
        Rect::new(
            coord.col as f32 * self.tile_size,
            coord.row as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Top-left pixel position of a tile
    pub fn tile_origin(&self, col: u32, row: u32) -> Vec2 {
        Vec2::new(col as f32 * self.tile_size, row as f32 * self.tile_size)
    }

    /// Every collidable tile touching `area`, row-major
    ///
    /// Tiles sharing only an edge with `area` are included so a mover sitting
    /// flush against a wall still sees it. The area is clamped to the grid.
    pub fn solid_tiles_in(&self, area: &Rect) -> Vec<(TileCoord, Rect)> {
        let mut found = Vec::new();
        if self.cols == 0 || self.rows == 0 || self.tile_size <= 0.0 {
            return found;
        }

        let max = area.max();
        let clamp_col = |v: f32| (v / self.tile_size).floor().clamp(0.0, (self.cols - 1) as f32) as u32;
        let clamp_row = |v: f32| (v / self.tile_size).floor().clamp(0.0, (self.rows - 1) as f32) as u32;

        let bounds = self.bounds();
        if max.x < 0.0 || max.y < 0.0 || area.x > bounds.width || area.y > bounds.height {
            return found;
        }

        for row in clamp_row(area.y)..=clamp_row(max.y) {
            for col in clamp_col(area.x)..=clamp_col(max.x) {
                if self.tiles[self.index(col, row)].is_collidable() {
                    let coord = TileCoord { col, row };
                    found.push((coord, self.tile_rect(coord)));
                }
            }
        }
        found
    }
}

/// Broad-phase area covered by `rect` moving through `displacement`
pub fn swept_bounds(rect: &Rect, displacement: Vec2) -> Rect {
    rect.union(&rect.translated(displacement))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bordered_grid_has_wall_ring() {
        let grid = TileGrid::bordered(5, 4, 16.0);
        assert!(grid.is_collidable(0, 0).unwrap());
        assert!(grid.is_collidable(4, 2).unwrap());
        assert!(grid.is_collidable(2, 3).unwrap());
        assert!(!grid.is_collidable(2, 2).unwrap());
        assert!(!grid.is_collidable(1, 1).unwrap());
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let mut grid = TileGrid::new(4, 4, 16.0);
        assert_eq!(
            grid.set_collidable(4, 0, true),
            Err(GridError::OutOfBounds {
                col: 4,
                row: 0,
                cols: 4,
                rows: 4
            })
        );
        assert!(grid.tile(-1, 2).is_err());
    }

    #[test]
    fn test_tile_rect() {
        let grid = TileGrid::new(4, 4, 16.0);
        let r = grid.tile_rect(TileCoord { col: 2, row: 1 });
        assert_eq!(r, Rect::new(32.0, 16.0, 16.0, 16.0));
    }

    #[test]
    fn test_solid_tiles_in_area() {
        let mut grid = TileGrid::new(8, 8, 16.0);
        grid.set_collidable(2, 1, true).unwrap();
        grid.set_collidable(5, 5, true).unwrap();

        let found = grid.solid_tiles_in(&Rect::new(20.0, 10.0, 16.0, 16.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, TileCoord { col: 2, row: 1 });
        assert_eq!(found[0].1, Rect::new(32.0, 16.0, 16.0, 16.0));
    }

    #[test]
    fn test_solid_tiles_includes_flush_neighbor() {
        let mut grid = TileGrid::new(4, 4, 16.0);
        grid.set_collidable(1, 0, true).unwrap();
        // Right edge exactly on the tile boundary
        let found = grid.solid_tiles_in(&Rect::new(0.0, 0.0, 16.0, 16.0));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_solid_tiles_clamps_outside_area() {
        let grid = TileGrid::bordered(4, 4, 16.0);
        assert!(grid.solid_tiles_in(&Rect::new(-500.0, -500.0, 10.0, 10.0)).is_empty());
        let all = grid.solid_tiles_in(&Rect::new(-100.0, -100.0, 1000.0, 1000.0));
        assert_eq!(all.len(), 12);
    }

    #[test]
    fn test_swept_bounds() {
        let r = Rect::new(16.0, 16.0, 16.0, 32.0);
        assert_eq!(
            swept_bounds(&r, Vec2::new(-4.0, 6.0)),
            Rect::new(12.0, 16.0, 20.0, 38.0)
        );
    }
}
