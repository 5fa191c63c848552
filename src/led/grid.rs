//! Cell storage and per-frame target sampling.
//!
//! The grid is a torus `num_cols x num_rows` LEDs wide. Cells stay at fixed
//! screen positions; scrolling moves the sampling window over the pattern,
//! so each cell asks "which pattern cell lands on me this frame?".
//!
//! Dense grids hold every coordinate and sample forward. Sparse grids only
//! hold lit or fading cells: they walk the pattern's active cells, invert the
//! mapping to find the grid coordinate, and sweep everything else toward off.

use std::collections::hash_map;
use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use tracing::debug;

use super::cell::{Cell, StepContext};
use super::Dimensions;
use crate::options::{GridMode, SignOptions};
use crate::pattern::Pattern;

/// Where the pattern sits this frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    pub origin_x: f32,
    pub origin_y: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub pitch: f32,
}

#[derive(Debug)]
enum Storage {
    /// Row-major, `num_cols * num_rows` cells
    Dense(Vec<Cell>),
    Sparse(HashMap<u64, Cell>),
}

#[derive(Debug)]
pub struct Grid {
    storage: Storage,
    num_cols: u32,
    num_rows: u32,
    /// Keys visited by the active pass; reused across frames
    touched: HashSet<u64>,
    lifespan: u32,
}

/// Packed sparse key
pub fn cell_key(col: u32, row: u32) -> u64 {
    (row as u64) << 32 | col as u64
}

/// Floored modulo into `[0, extent)`.
pub fn wrap(value: f32, extent: f32) -> f32 {
    if !(extent > 0.0) || !value.is_finite() {
        return 0.0;
    }
    let r = value.rem_euclid(extent);
    // rem_euclid may round up to `extent` for tiny negative inputs
    if r >= extent {
        0.0
    } else {
        r
    }
}

/// Like [`wrap`], but into `(0, extent]`.
fn wrap_upper(value: f32, extent: f32) -> f32 {
    let r = wrap(value, extent);
    if r == 0.0 {
        extent
    } else {
        r
    }
}

/// Index of the pitch-wide slot `(i * pitch, (i + 1) * pitch]` holding `rel`.
fn slot_index(rel: f32, pitch: f32) -> usize {
    ((rel / pitch).ceil() as usize).saturating_sub(1)
}

/// `((i % n) + n) % n`
pub fn wrap_index(i: i64, n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let n = n as i64;
    (((i % n) + n) % n) as u32
}

impl Grid {
    pub fn new(mode: GridMode) -> Self {
        let (storage, lifespan) = match mode {
            GridMode::Fill => (Storage::Dense(Vec::new()), 0),
            GridMode::Sparse { lifespan } => (Storage::Sparse(HashMap::new()), lifespan),
        };
        Self {
            storage,
            num_cols: 0,
            num_rows: 0,
            touched: HashSet::new(),
            lifespan,
        }
    }

    pub fn num_cols(&self) -> u32 {
        self.num_cols
    }

    pub fn num_rows(&self) -> u32 {
        self.num_rows
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self.storage, Storage::Sparse(_))
    }

    /// Grow the torus to at least `cols x rows`. Never shrinks. Returns
    /// true when the grid was (re)built.
    ///
    /// Dense grids are rebuilt from scratch on growth; sparse grids keep
    /// their in-flight cells and only widen the wrap period.
    pub fn ensure_size(
        &mut self,
        cols: u32,
        rows: u32,
        options: &SignOptions,
        dims: &Dimensions,
        rng: &mut StdRng,
    ) -> bool {
        let new_cols = self.num_cols.max(cols);
        let new_rows = self.num_rows.max(rows);
        let grew = new_cols != self.num_cols || new_rows != self.num_rows;

        self.num_cols = new_cols;
        self.num_rows = new_rows;

        match &mut self.storage {
            Storage::Dense(cells) => {
                let expected = new_cols as usize * new_rows as usize;
                if !grew && cells.len() == expected {
                    return false;
                }
                cells.clear();
                cells.reserve(expected);
                for row in 0..new_rows {
                    for col in 0..new_cols {
                        cells.push(Cell::spawn(col, row, options, dims, rng));
                    }
                }
                debug!("Dense grid rebuilt at {}x{}", new_cols, new_rows);
                true
            }
            Storage::Sparse(cells) => {
                if grew {
                    debug!(
                        "Sparse grid period now {}x{} ({} live cells)",
                        new_cols,
                        new_rows,
                        cells.len()
                    );
                }
                grew
            }
        }
    }

    /// Sample `pattern` for every cell and advance its state machine.
    pub fn update(&mut self, pattern: &Pattern, placement: &Placement, ctx: &mut StepContext) {
        if !(placement.pitch > 0.0) || self.num_cols == 0 || self.num_rows == 0 {
            return;
        }

        let Grid {
            storage,
            num_cols,
            num_rows,
            touched,
            lifespan,
        } = self;

        match storage {
            Storage::Dense(cells) => {
                let extent = Extent::new(*num_cols, *num_rows, placement.pitch, pattern);
                for cell in cells.iter_mut() {
                    let value = extent.sample(cell.col, cell.row, pattern, placement);
                    cell.advance(value, ctx);
                }
            }
            Storage::Sparse(cells) => {
                touched.clear();

                for (p_row, p_col, value) in pattern.active_cells() {
                    let (col, row) =
                        grid_coord_for(p_col, p_row, placement, *num_cols, *num_rows);
                    let key = cell_key(col, row);
                    if !touched.insert(key) {
                        continue;
                    }

                    let cell = cells
                        .entry(key)
                        .or_insert_with(|| Cell::spawn(col, row, ctx.options, ctx.dims, ctx.rng));
                    cell.lifespan = *lifespan;
                    cell.advance(value, ctx);
                }

                cells.retain(|key, cell| {
                    if touched.contains(key) {
                        return true;
                    }
                    if cell.is_settled() && cell.current_art_value == 0 {
                        if cell.lifespan == 0 {
                            return false;
                        }
                        cell.lifespan -= 1;
                        return true;
                    }
                    cell.advance(0, ctx);
                    true
                });
            }
        }
    }

    /// Live cells: every coordinate for dense grids, lit or fading cells
    /// for sparse grids.
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Dense(cells) => cells.len(),
            Storage::Sparse(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn active_count(&self) -> usize {
        self.cells().filter(|c| c.current_art_value > 0).count()
    }

    pub fn get(&self, col: u32, row: u32) -> Option<&Cell> {
        if col >= self.num_cols || row >= self.num_rows {
            return None;
        }
        match &self.storage {
            Storage::Dense(cells) => cells.get(row as usize * self.num_cols as usize + col as usize),
            Storage::Sparse(cells) => cells.get(&cell_key(col, row)),
        }
    }

    pub fn cells(&self) -> Cells<'_> {
        match &self.storage {
            Storage::Dense(cells) => Cells::Dense(cells.iter()),
            Storage::Sparse(cells) => Cells::Sparse(cells.values()),
        }
    }

    /// Sparse cells outlive a rescale; move them onto the new size ladder.
    /// Dense grids respawn instead.
    pub fn rescale(&mut self, from: &Dimensions, to: &Dimensions) {
        if let Storage::Sparse(cells) = &mut self.storage {
            for cell in cells.values_mut() {
                cell.rescale(from, to);
            }
        }
    }

    pub fn clear(&mut self) {
        match &mut self.storage {
            Storage::Dense(cells) => cells.clear(),
            Storage::Sparse(cells) => cells.clear(),
        }
        self.touched.clear();
    }
}

/// Borrowing iterator over live cells
pub enum Cells<'a> {
    Dense(std::slice::Iter<'a, Cell>),
    Sparse(hash_map::Values<'a, u64, Cell>),
}

impl<'a> Iterator for Cells<'a> {
    type Item = &'a Cell;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Dense(it) => it.next(),
            Self::Sparse(it) => it.next(),
        }
    }
}

/// Per-frame constants of the forward mapping
struct Extent {
    grid_w: f32,
    grid_h: f32,
    pattern_w: f32,
    pattern_h: f32,
}

impl Extent {
    fn new(num_cols: u32, num_rows: u32, pitch: f32, pattern: &Pattern) -> Self {
        Self {
            grid_w: num_cols as f32 * pitch,
            grid_h: num_rows as f32 * pitch,
            pattern_w: pattern.cols() as f32 * pitch,
            pattern_h: pattern.rows() as f32 * pitch,
        }
    }

    /// Pattern value under the wrapped center of `(col, row)`. A center on
    /// a pattern cell boundary belongs to the cell before it, so ties land
    /// where [`grid_coord_for`] puts them.
    fn sample(&self, col: u32, row: u32, pattern: &Pattern, placement: &Placement) -> u8 {
        let pitch = placement.pitch;
        let x = wrap(col as f32 * pitch + pitch * 0.5 + placement.scroll_x, self.grid_w);
        let y = wrap(row as f32 * pitch + pitch * 0.5 + placement.scroll_y, self.grid_h);

        // relative to the placed origin, wrapped so a negative origin still maps
        let rel_x = wrap_upper(x - placement.origin_x, self.grid_w);
        let rel_y = wrap_upper(y - placement.origin_y, self.grid_h);
        if rel_x > self.pattern_w || rel_y > self.pattern_h {
            return 0;
        }

        pattern.get(slot_index(rel_y, pitch), slot_index(rel_x, pitch))
    }
}

/// Inverse mapping: the grid coordinate whose wrapped center lands on
/// pattern cell `(p_col, p_row)`. Rounds half up, toward positive infinity.
pub fn grid_coord_for(
    p_col: usize,
    p_row: usize,
    placement: &Placement,
    num_cols: u32,
    num_rows: u32,
) -> (u32, u32) {
    let pitch = placement.pitch;
    let x = placement.origin_x + p_col as f32 * pitch - placement.scroll_x;
    let y = placement.origin_y + p_row as f32 * pitch - placement.scroll_y;
    (
        wrap_index(round_half_up(x / pitch), num_cols),
        wrap_index(round_half_up(y / pitch), num_rows),
    )
}

fn round_half_up(v: f32) -> i64 {
    (v + 0.5).floor() as i64
}
