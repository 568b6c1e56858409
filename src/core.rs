/// Length of one simulated 24-hour cycle, in minutes.
pub const CYCLE_DURATION_MIN: u32 = 1440;

/// Inclusive bounds for the number of days in a schedule.
pub const MIN_TOTAL_DAYS: usize = 1;
/// Inclusive upper bound for the number of days in a schedule.
pub const MAX_TOTAL_DAYS: usize = 14;

/// Grid dimension used when a recipe carries no dimension of its own.
pub const DEFAULT_GRID_DIM: u8 = 8;
/// Schedule length used when loading a single-day legacy recipe.
pub const DEFAULT_TOTAL_DAYS: usize = 7;

/// Target state of one LED: raw RGB components plus an on/off flag.
///
/// Cells are never merged; they are only combined by [`Cell::lerp`], which
/// produces a new cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Cell {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub active: bool,
}

impl Cell {
    /// Inactive black: the default for every cell the user has not touched.
    pub const OFF: Cell = Cell {
        r: 0,
        g: 0,
        b: 0,
        active: false,
    };

    pub fn new(r: u8, g: u8, b: u8, active: bool) -> Self {
        Self { r, g, b, active }
    }

    /// Linear interpolation in raw component space.
    ///
    /// Channels blend independently with round-and-clamp. `active` is not
    /// interpolated: on/off has no continuous intermediate, so it cuts hard
    /// from `a` to `b` at the midpoint.
    pub fn lerp(a: Cell, b: Cell, t: f64) -> Cell {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        Cell {
            r: lerp_u8(a.r, b.r, t),
            g: lerp_u8(a.g, b.g, t),
            b: lerp_u8(a.b, b.b, t),
            active: if t < 0.5 { a.active } else { b.active },
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::OFF
    }
}

/// Row-major square grid of cells, index = `row * dim + col`.
///
/// Grids constructed through this API always hold exactly `dim * dim` cells.
/// Grids decoded from external data may be shorter; [`Grid::cell_or_off`] is
/// the boundary where that mismatch is absorbed.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Grid {
    dim: u8,
    cells: Vec<Cell>,
}

impl Grid {
    /// All-off grid of the given dimension (dimension floor is 1).
    pub fn off(dim: u8) -> Self {
        let dim = dim.max(1);
        Self {
            dim,
            cells: vec![Cell::OFF; usize::from(dim) * usize::from(dim)],
        }
    }

    /// Build a grid from raw cells, padding with [`Cell::OFF`] or truncating
    /// so the length invariant holds for `dim`.
    pub fn from_cells(dim: u8, mut cells: Vec<Cell>) -> Self {
        let dim = dim.max(1);
        let want = usize::from(dim) * usize::from(dim);
        cells.resize(want, Cell::OFF);
        Self { dim, cells }
    }

    pub fn dim(&self) -> u8 {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, idx: usize) -> Option<&Cell> {
        self.cells.get(idx)
    }

    /// Cell at `idx`, or inactive black when the grid is shorter than
    /// expected (stale data from a prior smaller dimension).
    pub fn cell_or_off(&self, idx: usize) -> Cell {
        self.cells.get(idx).copied().unwrap_or(Cell::OFF)
    }

    /// Replace the cell at `idx`. Out-of-range indices are a no-op.
    pub fn set_cell(&mut self, idx: usize, cell: Cell) -> bool {
        match self.cells.get_mut(idx) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// New grid of `new_dim`, copying existing cells by flat index and
    /// filling new indices with inactive black.
    pub fn resized(&self, new_dim: u8) -> Grid {
        let new_dim = new_dim.max(1);
        let want = usize::from(new_dim) * usize::from(new_dim);
        let mut cells = Vec::with_capacity(want);
        for idx in 0..want {
            cells.push(self.cell_or_off(idx));
        }
        Grid {
            dim: new_dim,
            cells,
        }
    }
}

/// Clamp a keyframe timestamp to `[0, CYCLE_DURATION_MIN - 1]`.
pub fn clamp_cycle_time(time: u32) -> u32 {
    time.min(CYCLE_DURATION_MIN - 1)
}

/// Coarse time-of-day band, fixed hour boundaries 6/12/18/22.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Daypart {
    Morning,
    Midday,
    Evening,
    Night,
}

impl Daypart {
    /// Band for a minute-of-cycle in `[0, CYCLE_DURATION_MIN)`.
    pub fn from_minute(minute: u32) -> Self {
        match (minute % CYCLE_DURATION_MIN) / 60 {
            6..12 => Self::Morning,
            12..18 => Self::Midday,
            18..22 => Self::Evening,
            _ => Self::Night,
        }
    }
}
