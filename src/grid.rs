use rand::Rng;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Neighbor offsets in the order the search visits them.
pub const ORTHOGONAL_OFFSETS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no cells")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid cell token {token:?} at row {row}")]
    BadToken { row: usize, token: String },

    #[error("coordinate {0} is outside the grid")]
    OutOfBounds(Coordinate),

    #[error("invalid coordinate {0:?}, expected \"row,col\"")]
    BadCoordinate(String),
}

/// A (row, column) cell address. Signed so that stepping off the edge of a
/// map produces a coordinate the map can reject instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
    pub row: i32,
    pub col: i32,
}

impl Coordinate {
    pub const fn new(row: i32, col: i32) -> Self {
        Coordinate { row, col }
    }

    /// The coordinate `(dr, dc)` away, or `None` past the `i32` range.
    pub fn offset(self, dr: i32, dc: i32) -> Option<Self> {
        Some(Coordinate {
            row: self.row.checked_add(dr)?,
            col: self.col.checked_add(dc)?,
        })
    }

    /// Straight-line distance in the plane.
    pub fn euclidean(self, other: Coordinate) -> f64 {
        let dr = f64::from(self.row) - f64::from(other.row);
        let dc = f64::from(self.col) - f64::from(other.col);
        dr.hypot(dc)
    }

    /// True when `other` is exactly one orthogonal unit step away.
    pub fn is_adjacent(self, other: Coordinate) -> bool {
        let dr = (i64::from(self.row) - i64::from(other.row)).abs();
        let dc = (i64::from(self.col) - i64::from(other.col)).abs();
        dr + dc == 1
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl FromStr for Coordinate {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || GridError::BadCoordinate(s.to_string());
        let (row, col) = s.split_once(',').ok_or_else(bad)?;
        let row = row.trim().parse().map_err(|_| bad())?;
        let col = col.trim().parse().map_err(|_| bad())?;
        Ok(Coordinate { row, col })
    }
}

/// Diagnostic annotation left on a map by the search or its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// The cell was pushed onto the frontier.
    Frontier,
    /// The cell lies on the reported path.
    Path,
}

/// What the path finder needs from a map.
pub trait GridMap {
    /// Cost of entering `position`, or `None` when the cell is impassable or
    /// outside the map.
    fn get_cell_value(&self, position: Coordinate) -> Option<u32>;

    /// Records a visit. Never affects the result of a search.
    fn set_cell_value(&mut self, _position: Coordinate, _marker: Marker) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Open(u32),
    Wall,
}

/// Rectangular in-memory map with per-cell entry costs.
#[derive(Debug, Clone)]
pub struct CostGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    marks: Vec<Option<Marker>>,
}

impl CostGrid {
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        if expected == 0 {
            return Err(GridError::Empty);
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(GridError::Ragged {
                    row,
                    expected,
                    found: cells.len(),
                });
            }
        }

        let height = rows.len();
        let cells: Vec<Cell> = rows.into_iter().flatten().collect();
        Ok(CostGrid {
            rows: height,
            cols: expected,
            marks: vec![None; cells.len()],
            cells,
        })
    }

    /// A map where every cell costs `cost`.
    pub fn uniform(rows: usize, cols: usize, cost: u32) -> Self {
        CostGrid {
            rows,
            cols,
            cells: vec![Cell::Open(cost); rows * cols],
            marks: vec![None; rows * cols],
        }
    }

    /// Random costs in `1..=max_cost` with up to `num_walls` walls. Cells in
    /// `keep_open` never become walls.
    pub fn random<R: Rng>(
        rng: &mut R,
        rows: usize,
        cols: usize,
        num_walls: usize,
        max_cost: u32,
        keep_open: &[Coordinate],
    ) -> Self {
        let max_cost = max_cost.max(1);
        let cells = (0..rows * cols)
            .map(|_| Cell::Open(rng.gen_range(1..=max_cost)))
            .collect();
        let mut grid = CostGrid {
            rows,
            cols,
            cells,
            marks: vec![None; rows * cols],
        };
        if rows == 0 || cols == 0 {
            return grid;
        }

        // Bounded attempts so dense requests on small maps still terminate.
        let mut walls_placed = 0;
        let mut attempts = 0;
        while walls_placed < num_walls && attempts < num_walls * 3 {
            attempts += 1;
            let pos = Coordinate::new(
                rng.gen_range(0..rows) as i32,
                rng.gen_range(0..cols) as i32,
            );
            if keep_open.contains(&pos) {
                continue;
            }
            if let Some(idx) = grid.index(pos) {
                if grid.cells[idx] != Cell::Wall {
                    grid.cells[idx] = Cell::Wall;
                    walls_placed += 1;
                }
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell(&self, pos: Coordinate) -> Option<Cell> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    pub fn set_cell(&mut self, pos: Coordinate, cell: Cell) -> Result<(), GridError> {
        let idx = self.index(pos).ok_or(GridError::OutOfBounds(pos))?;
        self.cells[idx] = cell;
        Ok(())
    }

    pub fn mark_at(&self, pos: Coordinate) -> Option<Marker> {
        self.index(pos).and_then(|idx| self.marks[idx])
    }

    pub fn clear_marks(&mut self) {
        self.marks.iter_mut().for_each(|m| *m = None);
    }

    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Wall).count()
    }

    /// Renders the map with `start` and `goal` highlighted.
    pub fn render(&self, start: Coordinate, goal: Coordinate) -> String {
        let mut out = String::new();
        out.push_str("Legend: S=Start, G=Goal, *=Path, +=Frontier, #=Wall, digit=Cost\n");

        out.push_str("   ");
        for col in 0..self.cols() {
            out.push_str(&format!("{:2}", col % 10));
        }
        out.push('\n');

        for row in 0..self.rows() {
            out.push_str(&format!("{:2} ", row));
            for col in 0..self.cols() {
                let pos = Coordinate::new(row as i32, col as i32);
                out.push(' ');
                out.push(self.glyph(pos, start, goal));
            }
            out.push('\n');
        }
        out
    }

    fn glyph(&self, pos: Coordinate, start: Coordinate, goal: Coordinate) -> char {
        if pos == start {
            return 'S';
        }
        if pos == goal {
            return 'G';
        }
        match (self.cell(pos), self.mark_at(pos)) {
            (Some(Cell::Wall), _) | (None, _) => '#',
            (_, Some(Marker::Path)) => '*',
            (_, Some(Marker::Frontier)) => '+',
            (Some(Cell::Open(cost)), None) => cost_glyph(cost),
        }
    }

    fn index(&self, pos: Coordinate) -> Option<usize> {
        let row = usize::try_from(pos.row).ok()?;
        let col = usize::try_from(pos.col).ok()?;
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }
}

fn cost_glyph(cost: u32) -> char {
    char::from_digit(cost, 10).unwrap_or('9')
}

impl GridMap for CostGrid {
    fn get_cell_value(&self, position: Coordinate) -> Option<u32> {
        match self.cell(position)? {
            Cell::Open(cost) => Some(cost),
            Cell::Wall => None,
        }
    }

    fn set_cell_value(&mut self, position: Coordinate, marker: Marker) {
        if let Some(idx) = self.index(position) {
            self.marks[idx] = Some(marker);
        }
    }
}

impl fmt::Display for CostGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows() {
            let line: Vec<String> = (0..self.cols())
                .map(|col| match self.cells[row * self.cols() + col] {
                    Cell::Open(cost) => cost.to_string(),
                    Cell::Wall => "#".to_string(),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Parses whitespace-separated rows: a number is a cost, `#` is a wall.
///
/// ```
/// use grid_astar::grid::{Cell, Coordinate, CostGrid};
///
/// let grid: CostGrid = "1 1\n# 3".parse().unwrap();
/// assert_eq!(grid.cell(Coordinate::new(1, 0)), Some(Cell::Wall));
/// assert_eq!(grid.cell(Coordinate::new(1, 1)), Some(Cell::Open(3)));
/// ```
impl FromStr for CostGrid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(row, line)| {
                line.split_whitespace()
                    .map(|token| match token {
                        "#" => Ok(Cell::Wall),
                        _ => token.parse().map(Cell::Open).map_err(|_| GridError::BadToken {
                            row,
                            token: token.to_string(),
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        CostGrid::from_rows(rows)
    }
}
