//! Uniform spatial grid used to bound neighbor searches.

use ecosim_core::{Bounds, Vec2};

/// A fixed-cell-size bucket grid over the simulation bounds.
///
/// Cell `(gx, gy)` holds every key whose position maps to it through
/// `floor(pos / cell_size)`. Positions outside `[0,width) x [0,height)` are
/// never stored.
#[derive(Debug, Clone)]
pub struct SpatialGrid<T> {
    bounds: Bounds,
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<T>>,
    len: usize,
}

impl<T: Copy + PartialEq> SpatialGrid<T> {
    pub fn new(bounds: Bounds, cell_size: f32) -> Self {
        debug_assert!(cell_size > 0.0, "cell_size must be positive");
        let cols = ((bounds.width / cell_size).ceil() as usize).max(1);
        let rows = ((bounds.height / cell_size).ceil() as usize).max(1);

        Self {
            bounds,
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
            len: 0,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Empty every cell, keeping allocations
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.len = 0;
    }

    /// Cell coordinates for a position, `None` when out of bounds
    pub fn cell_of(&self, pos: Vec2) -> Option<(usize, usize)> {
        if !self.bounds.contains(pos) {
            return None;
        }
        let gx = ((pos.x / self.cell_size).floor() as usize).min(self.cols - 1);
        let gy = ((pos.y / self.cell_size).floor() as usize).min(self.rows - 1);
        Some((gx, gy))
    }

    /// Place `key` in the cell containing `pos`. Returns false (and stores
    /// nothing) for out-of-bounds positions.
    pub fn insert(&mut self, key: T, pos: Vec2) -> bool {
        match self.cell_of(pos) {
            Some((gx, gy)) => {
                let index = self.index(gx, gy);
                self.cells[index].push(key);
                self.len += 1;
                true
            }
            None => false,
        }
    }

    /// Remove `key` from the cell containing `pos`
    pub fn remove(&mut self, key: T, pos: Vec2) -> bool {
        let Some((gx, gy)) = self.cell_of(pos) else {
            return false;
        };
        let index = self.index(gx, gy);
        let cell = &mut self.cells[index];
        match cell.iter().position(|&k| k == key) {
            Some(slot) => {
                // Preserve insertion order so nearest-neighbor ties stay stable
                cell.remove(slot);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Keys stored in a single cell
    pub fn cell(&self, gx: usize, gy: usize) -> &[T] {
        if gx >= self.cols || gy >= self.rows {
            return &[];
        }
        &self.cells[self.index(gx, gy)]
    }

    /// Cells overlapping the disk of `radius` around `center`
    pub fn cells_near(&self, center: Vec2, radius: f32) -> Vec<(usize, usize)> {
        let radius = radius.max(0.0);
        if !center.is_finite() || !radius.is_finite() {
            return Vec::new();
        }

        let min_x = ((center.x - radius) / self.cell_size).floor();
        let min_y = ((center.y - radius) / self.cell_size).floor();
        let max_x = ((center.x + radius) / self.cell_size).floor();
        let max_y = ((center.y + radius) / self.cell_size).floor();

        if max_x < 0.0 || max_y < 0.0 {
            return Vec::new();
        }

        let gx0 = min_x.max(0.0) as usize;
        let gy0 = min_y.max(0.0) as usize;
        let gx1 = (max_x as usize).min(self.cols - 1);
        let gy1 = (max_y as usize).min(self.rows - 1);

        if gx0 > gx1 || gy0 > gy1 {
            return Vec::new();
        }

        let r_sq = radius * radius;
        let span = Vec2::splat(self.cell_size);
        let mut cells = Vec::with_capacity((gx1 - gx0 + 1) * (gy1 - gy0 + 1));

        for gy in gy0..=gy1 {
            for gx in gx0..=gx1 {
                let cell_min = Vec2::new(gx as f32, gy as f32) * self.cell_size;
                let nearest = center.clamp(cell_min, cell_min + span);
                if nearest.distance_squared(center) <= r_sq {
                    cells.push((gx, gy));
                }
            }
        }

        cells
    }

    /// Candidate keys from every cell overlapping the query disk. May include
    /// keys outside the radius; callers filter by exact distance.
    pub fn query(&self, center: Vec2, radius: f32) -> impl Iterator<Item = T> + '_ {
        self.cells_near(center, radius)
            .into_iter()
            .flat_map(move |(gx, gy)| self.cell(gx, gy).iter().copied())
    }

    fn index(&self, gx: usize, gy: usize) -> usize {
        gy * self.cols + gx
    }
}
