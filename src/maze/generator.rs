//! Procedural maze grid generation
//!
//! Produces a grid of cell codes: walled border, random interior walls, and
//! fixed carve-outs at the start and finish. Paths are NOT guaranteed to
//! connect start and finish.

use std::collections::VecDeque;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cell contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellCode {
    #[default]
    Empty = 0,
    /// Wall running along the column axis (X)
    Horizontal = 1,
    /// Wall running along the row axis (Z)
    Vertical = 2,
    CornerTopLeft = 3,
    CornerTopRight = 4,
    CornerBottomLeft = 5,
    CornerBottomRight = 6,
}

impl CellCode {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CellCode::Empty),
            1 => Some(CellCode::Horizontal),
            2 => Some(CellCode::Vertical),
            3 => Some(CellCode::CornerTopLeft),
            4 => Some(CellCode::CornerTopRight),
            5 => Some(CellCode::CornerBottomLeft),
            6 => Some(CellCode::CornerBottomRight),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_empty(self) -> bool {
        self == CellCode::Empty
    }

    pub fn is_wall(self) -> bool {
        !self.is_empty()
    }

    fn glyph(self) -> char {
        match self {
            CellCode::Empty => '.',
            CellCode::Horizontal => '-',
            CellCode::Vertical => '|',
            CellCode::CornerTopLeft => '┌',
            CellCode::CornerTopRight => '┐',
            CellCode::CornerBottomLeft => '└',
            CellCode::CornerBottomRight => '┘',
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid must be at least 3x3, got {rows}x{columns}")]
    TooSmall { rows: usize, columns: usize },
    #[error("row {row} has {len} cells, expected {expected}")]
    Ragged { row: usize, len: usize, expected: usize },
    #[error("unknown cell code {code} at ({row}, {column})")]
    UnknownCode { row: usize, column: usize, code: u8 },
}

/// Row-major grid of cell codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<CellCode>,
}

impl Grid {
    /// Start cell (row, column)
    pub const START: (usize, usize) = (1, 0);

    fn filled(rows: usize, columns: usize, code: CellCode) -> Self {
        Self {
            rows,
            columns,
            cells: vec![code; rows * columns],
        }
    }

    /// Build a grid from raw integer codes
    pub fn from_codes(codes: &[Vec<u8>]) -> Result<Self, GridError> {
        let rows = codes.len();
        let columns = codes.first().map(Vec::len).unwrap_or(0);
        if rows < 3 || columns < 3 {
            return Err(GridError::TooSmall { rows, columns });
        }
        let mut grid = Self::filled(rows, columns, CellCode::Empty);
        for (r, row) in codes.iter().enumerate() {
            if row.len() != columns {
                return Err(GridError::Ragged {
                    row: r,
                    len: row.len(),
                    expected: columns,
                });
            }
            for (c, &code) in row.iter().enumerate() {
                let cell = CellCode::from_code(code).ok_or(GridError::UnknownCode {
                    row: r,
                    column: c,
                    code,
                })?;
                grid.set(r, c, cell);
            }
        }
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, column: usize) -> CellCode {
        self.cells[row * self.columns + column]
    }

    fn set(&mut self, row: usize, column: usize, code: CellCode) {
        self.cells[row * self.columns + column] = code;
    }

    /// Cell holding the finish marker (last column, second-to-last row)
    pub fn finish(&self) -> (usize, usize) {
        (self.rows - 2, self.columns - 1)
    }

    /// The two cells that must stay open at the finish
    pub fn finish_approach(&self) -> [(usize, usize); 2] {
        [
            (self.rows - 2, self.columns - 1),
            (self.rows - 2, self.columns - 2),
        ]
    }

    pub fn is_border(&self, row: usize, column: usize) -> bool {
        row == 0 || row == self.rows - 1 || column == 0 || column == self.columns - 1
    }

    /// Iterate over `(row, column, code)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, CellCode)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &code)| (i / self.columns, i % self.columns, code))
    }

    /// Grid as nested integer codes
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        (0..self.rows)
            .map(|r| (0..self.columns).map(|c| self.get(r, c).code()).collect())
            .collect()
    }

    /// Whether `to` can be reached from `from` by 4-connected steps over
    /// empty cells
    pub fn has_open_path(&self, from: (usize, usize), to: (usize, usize)) -> bool {
        if self.get(from.0, from.1).is_wall() || self.get(to.0, to.1).is_wall() {
            return false;
        }
        let mut seen = vec![false; self.cells.len()];
        let mut queue = VecDeque::from([from]);
        seen[from.0 * self.columns + from.1] = true;

        while let Some((r, c)) = queue.pop_front() {
            if (r, c) == to {
                return true;
            }
            let neighbors = [
                (r.wrapping_sub(1), c),
                (r + 1, c),
                (r, c.wrapping_sub(1)),
                (r, c + 1),
            ];
            for (nr, nc) in neighbors {
                if nr >= self.rows || nc >= self.columns {
                    continue;
                }
                let idx = nr * self.columns + nc;
                if !seen[idx] && self.cells[idx].is_empty() {
                    seen[idx] = true;
                    queue.push_back((nr, nc));
                }
            }
        }
        false
    }

    /// Whether the start cell connects to the finish cell
    pub fn is_solvable(&self) -> bool {
        self.has_open_path(Self::START, self.finish())
    }

    /// Compact text rendering, one line per row
    pub fn to_ascii(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            let line: String = (0..self.columns).map(|c| self.get(r, c).glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Random maze grid generator
#[derive(Debug, Clone, Copy, Default)]
pub struct MazeGenerator;

impl MazeGenerator {
    /// Generate a `rows` x `columns` grid.
    ///
    /// Rows and columns must both be at least 3. Non-square grids are
    /// supported: the border rule uses each dimension's own bound.
    pub fn generate<R: Rng + ?Sized>(rows: usize, columns: usize, rng: &mut R) -> Grid {
        assert!(
            rows >= 3 && columns >= 3,
            "maze grid must be at least 3x3, got {rows}x{columns}"
        );
        let mut grid = Grid::filled(rows, columns, CellCode::Empty);

        // Border: top/bottom rows vertical, then left/right columns horizontal
        // (the column rule wins at the four corners)
        for r in 0..rows {
            for c in 0..columns {
                if r == 0 || r == rows - 1 {
                    grid.set(r, c, CellCode::Vertical);
                }
                if c == 0 || c == columns - 1 {
                    grid.set(r, c, CellCode::Horizontal);
                }
            }
        }

        // Interior: half open, half split evenly between the two wall axes
        for r in 1..rows - 1 {
            for c in 1..columns - 1 {
                if rng.random_bool(0.5) {
                    let code = if rng.random_bool(0.5) {
                        CellCode::Horizontal
                    } else {
                        CellCode::Vertical
                    };
                    grid.set(r, c, code);
                }
            }
        }

        // Start and finish carve-outs
        grid.set(1, 0, CellCode::Empty);
        grid.set(2, 0, CellCode::Horizontal);
        grid.set(rows - 2, columns - 1, CellCode::Empty);
        grid.set(1, 1, CellCode::Empty);
        grid.set(rows - 2, columns - 2, CellCode::Empty);

        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn assert_well_formed(grid: &Grid) {
        let (rows, columns) = (grid.rows(), grid.columns());
        assert_eq!(grid.len(), rows * columns);
        for (r, c, code) in grid.iter() {
            if grid.is_border(r, c) && (r, c) != Grid::START && (r, c) != grid.finish() {
                assert!(code.is_wall(), "border cell ({r}, {c}) is open");
            }
        }
        assert!(grid.get(1, 0).is_empty());
        for (r, c) in grid.finish_approach() {
            assert!(grid.get(r, c).is_empty());
        }
    }

    #[test]
    fn test_grid_shape_and_carve_outs_across_seeds() {
        for seed in 0..200 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let size = 3 + (seed as usize % 10);
            let grid = MazeGenerator::generate(size, size, &mut rng);
            assert_well_formed(&grid);
        }
    }

    #[test]
    fn test_non_square_grids_are_well_formed() {
        let mut rng = Pcg32::seed_from_u64(5);
        for (rows, columns) in [(3, 7), (8, 4), (12, 5)] {
            let grid = MazeGenerator::generate(rows, columns, &mut rng);
            assert_eq!(grid.rows(), rows);
            assert_eq!(grid.columns(), columns);
            assert_well_formed(&grid);
        }
    }

    #[test]
    fn test_same_seed_same_grid() {
        let a = MazeGenerator::generate(10, 10, &mut Pcg32::seed_from_u64(42));
        let b = MazeGenerator::generate(10, 10, &mut Pcg32::seed_from_u64(42));
        let c = MazeGenerator::generate(10, 10, &mut Pcg32::seed_from_u64(43));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_some_grids_are_unsolvable() {
        let unsolvable = (0..50)
            .map(|seed| MazeGenerator::generate(10, 10, &mut Pcg32::seed_from_u64(seed)))
            .filter(|grid| !grid.is_solvable())
            .count();
        assert!(unsolvable > 0, "expected at least one blocked maze");
    }

    #[test]
    fn test_interior_mix_is_roughly_half_open() {
        let grid = MazeGenerator::generate(40, 40, &mut Pcg32::seed_from_u64(9));
        let interior: Vec<CellCode> = grid
            .iter()
            .filter(|&(r, c, _)| !grid.is_border(r, c))
            .map(|(_, _, code)| code)
            .collect();
        let open = interior.iter().filter(|c| c.is_empty()).count() as f32;
        let ratio = open / interior.len() as f32;
        assert!((0.4..0.6).contains(&ratio), "open ratio {ratio}");
        assert!(interior.iter().any(|&c| c == CellCode::Horizontal));
        assert!(interior.iter().any(|&c| c == CellCode::Vertical));
    }

    proptest::proptest! {
        #[test]
        fn prop_any_size_and_seed_is_well_formed(
            rows in 3usize..24,
            columns in 3usize..24,
            seed in proptest::prelude::any::<u64>(),
        ) {
            let grid = MazeGenerator::generate(rows, columns, &mut Pcg32::seed_from_u64(seed));
            proptest::prop_assert_eq!((grid.rows(), grid.columns()), (rows, columns));
            assert_well_formed(&grid);
        }
    }

    #[test]
    #[should_panic]
    fn test_tiny_grid_panics() {
        MazeGenerator::generate(2, 5, &mut Pcg32::seed_from_u64(0));
    }

    #[test]
    fn test_from_codes_validation() {
        assert_eq!(
            Grid::from_codes(&[vec![0, 0], vec![0, 0]]),
            Err(GridError::TooSmall { rows: 2, columns: 2 })
        );
        assert!(matches!(
            Grid::from_codes(&[vec![0; 3], vec![0; 2], vec![0; 3]]),
            Err(GridError::Ragged { row: 1, .. })
        ));
        assert!(matches!(
            Grid::from_codes(&[vec![0; 3], vec![0, 9, 0], vec![0; 3]]),
            Err(GridError::UnknownCode { code: 9, .. })
        ));
        let grid = Grid::from_codes(&[vec![1, 2, 3], vec![4, 5, 6], vec![0, 0, 0]])
            .expect("valid codes");
        assert_eq!(grid.get(1, 2), CellCode::CornerBottomRight);
        assert_eq!(grid.to_codes()[0], vec![1, 2, 3]);
    }
}
