use std::fmt;

use bitflags::bitflags;
use thiserror::Error;

bitflags! {
    /// Packed per-cell state.
    ///
    /// Wall bits are what the carver tears down. Border bits sit five places
    /// higher, one per side, and mark the outer rim of the maze and the
    /// perimeter of rooms; carving never crosses a border.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CellFlags: u16 {
        const WALL_TOP      = 0x0001;
        const WALL_BOTTOM   = 0x0002;
        const WALL_LEFT     = 0x0004;
        const WALL_RIGHT    = 0x0008;
        // Not yet entered by the carver.
        const UNVISITED     = 0x0010;
        const BORDER_TOP    = 0x0020;
        const BORDER_BOTTOM = 0x0040;
        const BORDER_LEFT   = 0x0080;
        const BORDER_RIGHT  = 0x0100;
        const IN_ROOM       = 0x0200;

        const WALLS   = Self::WALL_TOP.bits() | Self::WALL_BOTTOM.bits()
                      | Self::WALL_LEFT.bits() | Self::WALL_RIGHT.bits();
        const BORDERS = Self::BORDER_TOP.bits() | Self::BORDER_BOTTOM.bits()
                      | Self::BORDER_LEFT.bits() | Self::BORDER_RIGHT.bits();
    }
}

/// Distance between a wall bit and the border bit of the same side.
pub const BORDER_SHIFT: u32 = 5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("({dx}, {dy}) is not an axis-aligned unit step")]
    InvalidDirection { dx: i32, dy: i32 },

    #[error("cell ({x}, {y}) lies outside the grid")]
    OutOfBounds { x: i32, y: i32 },
}

/// One of the four grid directions, in the scan order the carvers use.
///
/// `y` grows downwards, so `Down` is `(0, 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Right,
    Down,
    Left,
    Up,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Right, Dir::Down, Dir::Left, Dir::Up];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wraps around, so `from_index(i + 1)` is a quarter turn from `from_index(i)`.
    #[inline]
    pub fn from_index(i: usize) -> Dir {
        Self::ALL[i & 3]
    }

    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Right => (1, 0),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Up => (0, -1),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Result<Dir, GridError> {
        match (dx, dy) {
            (1, 0) => Ok(Dir::Right),
            (0, 1) => Ok(Dir::Down),
            (-1, 0) => Ok(Dir::Left),
            (0, -1) => Ok(Dir::Up),
            _ => Err(GridError::InvalidDirection { dx, dy }),
        }
    }

    #[inline]
    pub fn opposite(self) -> Dir {
        Self::from_index(self.index() + 2)
    }

    #[inline]
    pub fn wall(self) -> CellFlags {
        match self {
            Dir::Right => CellFlags::WALL_RIGHT,
            Dir::Down => CellFlags::WALL_BOTTOM,
            Dir::Left => CellFlags::WALL_LEFT,
            Dir::Up => CellFlags::WALL_TOP,
        }
    }

    #[inline]
    pub fn border(self) -> CellFlags {
        CellFlags::from_bits_retain(self.wall().bits() << BORDER_SHIFT)
    }
}

/// W×H grid of packed cells, column `x` in `0..width`, row `y` in `0..height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellGrid {
    width: i32,
    height: i32,
    cells: Vec<CellFlags>,
}

impl CellGrid {
    /// Empty grid: no walls, no borders, everything visited.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid must not be empty");
        Self {
            width,
            height,
            cells: vec![CellFlags::empty(); (width * height) as usize],
        }
    }

    /// Grid ready for carving, see [`CellGrid::initialize`].
    pub fn filled(width: i32, height: i32) -> Self {
        let mut grid = Self::new(width, height);
        grid.initialize();
        grid
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// `true` for every position outside the grid; reaching one means the
    /// walker left through the exit.
    #[inline]
    pub fn is_end_position(&self, x: i32, y: i32) -> bool {
        !self.contains(x, y)
    }

    #[inline]
    fn idx(&self, x: i32, y: i32) -> usize {
        assert!(self.contains(x, y), "({x}, {y}) outside grid");
        (y * self.width + x) as usize
    }

    /// Raw flags of an in-bounds cell. Panics outside the grid.
    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> CellFlags {
        self.cells[self.idx(x, y)]
    }

    pub fn try_cell(&self, x: i32, y: i32) -> Result<CellFlags, GridError> {
        if self.contains(x, y) {
            Ok(self.cell(x, y))
        } else {
            Err(GridError::OutOfBounds { x, y })
        }
    }

    #[inline]
    pub(crate) fn insert(&mut self, x: i32, y: i32, flags: CellFlags) {
        let i = self.idx(x, y);
        self.cells[i].insert(flags);
    }

    #[inline]
    pub(crate) fn remove(&mut self, x: i32, y: i32, flags: CellFlags) {
        let i = self.idx(x, y);
        self.cells[i].remove(flags);
    }

    /*──────────────────────────── lifecycle ────────────────────────────*/

    /// Every cell gets all four walls and the unvisited mark; the outer rim
    /// gets its border bits.
    pub fn initialize(&mut self) {
        self.cells.fill(CellFlags::WALLS | CellFlags::UNVISITED);
        for x in 0..self.width {
            self.insert(x, 0, CellFlags::BORDER_TOP);
            self.insert(x, self.height - 1, CellFlags::BORDER_BOTTOM);
        }
        for y in 0..self.height {
            self.insert(0, y, CellFlags::BORDER_LEFT);
            self.insert(self.width - 1, y, CellFlags::BORDER_RIGHT);
        }
    }

    /*───────────────────────────── queries ─────────────────────────────*/

    #[inline]
    pub fn has_wall(&self, x: i32, y: i32, dir: Dir) -> bool {
        self.cell(x, y).contains(dir.wall())
    }

    #[inline]
    pub fn has_border(&self, x: i32, y: i32, dir: Dir) -> bool {
        self.cell(x, y).contains(dir.border())
    }

    #[inline]
    pub fn is_visited(&self, x: i32, y: i32) -> bool {
        !self.cell(x, y).contains(CellFlags::UNVISITED)
    }

    #[inline]
    pub fn is_in_room(&self, x: i32, y: i32) -> bool {
        self.contains(x, y) && self.cell(x, y).contains(CellFlags::IN_ROOM)
    }

    /// Wall presence as seen by a navigator. Out-of-range cells and deltas
    /// are errors rather than silently "no wall".
    pub fn wall_towards(&self, x: i32, y: i32, dx: i32, dy: i32) -> Result<bool, GridError> {
        let dir = Dir::from_delta(dx, dy)?;
        Ok(self.try_cell(x, y)?.contains(dir.wall()))
    }

    /// May the carver step from `(x, y)` towards `dir` for the first time?
    ///
    /// True iff no border separates the two cells and the neighbour has not
    /// been visited yet.
    pub fn can_go(&self, x: i32, y: i32, dir: Dir) -> bool {
        if self.has_border(x, y, dir) {
            return false;
        }
        let (dx, dy) = dir.delta();
        self.contains(x + dx, y + dy) && !self.is_visited(x + dx, y + dy)
    }

    /// Cells that can be reached from `(x, y)` in one step without crossing a wall.
    pub fn open_neighbours(&self, x: i32, y: i32) -> impl Iterator<Item = (Dir, i32, i32)> + '_ {
        Dir::ALL.into_iter().filter_map(move |dir| {
            let (dx, dy) = dir.delta();
            (!self.has_wall(x, y, dir) && self.contains(x + dx, y + dy))
                .then_some((dir, x + dx, y + dy))
        })
    }

    /*──────────────────────────── mutation ─────────────────────────────*/

    pub fn mark_visited(&mut self, x: i32, y: i32) {
        self.remove(x, y, CellFlags::UNVISITED);
    }

    /// Clear the wall between `(x, y)` and its neighbour on both sides.
    pub fn delete_wall(&mut self, x: i32, y: i32, dir: Dir) {
        let (dx, dy) = dir.delta();
        self.remove(x, y, dir.wall());
        if self.contains(x + dx, y + dy) {
            self.remove(x + dx, y + dy, dir.opposite().wall());
        }
    }

    pub(crate) fn delete_border(&mut self, x: i32, y: i32, dir: Dir) {
        let (dx, dy) = dir.delta();
        self.remove(x, y, dir.border());
        if self.contains(x + dx, y + dy) {
            self.remove(x + dx, y + dy, dir.opposite().border());
        }
    }

    pub(crate) fn add_border_wall(&mut self, x: i32, y: i32, dir: Dir) {
        let (dx, dy) = dir.delta();
        self.insert(x, y, dir.wall() | dir.border());
        if self.contains(x + dx, y + dy) {
            let back = dir.opposite();
            self.insert(x + dx, y + dy, back.wall() | back.border());
        }
    }

    /// Open the outer edge of a rim cell: both its border and its wall go.
    pub fn open_exit(&mut self, x: i32, y: i32, dir: Dir) {
        self.remove(x, y, dir.wall() | dir.border());
    }
}

/// ASCII dump, one character row per wall line: `+--+` for walls, `|` for
/// vertical walls, `#` for room cells.
impl fmt::Display for CellGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let top = if self.has_wall(x, y, Dir::Up) { "--" } else { "  " };
                write!(f, "+{top}")?;
            }
            writeln!(f, "+")?;
            for x in 0..self.width {
                let left = if self.has_wall(x, y, Dir::Left) { '|' } else { ' ' };
                let fill = if self.is_in_room(x, y) { "##" } else { "  " };
                write!(f, "{left}{fill}")?;
            }
            let right = self.width - 1;
            writeln!(f, "{}", if self.has_wall(right, y, Dir::Right) { '|' } else { ' ' })?;
        }
        for x in 0..self.width {
            let bottom = if self.has_wall(x, self.height - 1, Dir::Down) { "--" } else { "  " };
            write!(f, "+{bottom}")?;
        }
        writeln!(f, "+")
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_sets_walls_and_rim_borders() {
        let grid = CellGrid::filled(4, 3);
        for x in 0..4 {
            for y in 0..3 {
                let c = grid.cell(x, y);
                assert!(c.contains(CellFlags::WALLS | CellFlags::UNVISITED));
                assert_eq!(c.contains(CellFlags::BORDER_TOP), y == 0);
                assert_eq!(c.contains(CellFlags::BORDER_BOTTOM), y == 2);
                assert_eq!(c.contains(CellFlags::BORDER_LEFT), x == 0);
                assert_eq!(c.contains(CellFlags::BORDER_RIGHT), x == 3);
                assert!(!c.contains(CellFlags::IN_ROOM));
            }
        }
    }

    #[test]
    fn border_bits_mirror_wall_bits() {
        for dir in Dir::ALL {
            assert_eq!(dir.border().bits(), dir.wall().bits() << BORDER_SHIFT);
            assert!(CellFlags::BORDERS.contains(dir.border()));
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn direction_lookup_rejects_diagonals() {
        assert_eq!(Dir::from_delta(0, -1), Ok(Dir::Up));
        assert_eq!(
            Dir::from_delta(1, 1),
            Err(GridError::InvalidDirection { dx: 1, dy: 1 })
        );
        assert!(Dir::from_delta(0, 0).is_err());
        assert!(Dir::from_delta(2, 0).is_err());
    }

    #[test]
    fn delete_wall_is_symmetric() {
        let mut grid = CellGrid::filled(3, 3);
        grid.delete_wall(1, 1, Dir::Right);
        assert!(!grid.has_wall(1, 1, Dir::Right));
        assert!(!grid.has_wall(2, 1, Dir::Left));
        assert!(grid.has_wall(1, 1, Dir::Left));

        grid.delete_wall(1, 1, Dir::Up);
        assert!(!grid.has_wall(1, 0, Dir::Down));
    }

    #[test]
    fn can_go_respects_borders_and_visits() {
        let mut grid = CellGrid::filled(3, 3);
        // outer rim is a border
        assert!(!grid.can_go(0, 0, Dir::Left));
        assert!(!grid.can_go(0, 0, Dir::Up));
        assert!(grid.can_go(0, 0, Dir::Right));

        grid.mark_visited(1, 0);
        assert!(!grid.can_go(0, 0, Dir::Right));
        assert!(grid.can_go(0, 0, Dir::Down));
    }

    #[test]
    fn exit_opens_wall_and_border() {
        let mut grid = CellGrid::filled(4, 4);
        grid.open_exit(0, 2, Dir::Left);
        assert!(!grid.has_wall(0, 2, Dir::Left));
        assert!(!grid.has_border(0, 2, Dir::Left));
        assert!(grid.is_end_position(-1, 2));
        assert!(!grid.is_end_position(0, 2));
    }

    #[test]
    fn wall_queries_fail_loudly() {
        let grid = CellGrid::filled(2, 2);
        assert_eq!(grid.wall_towards(0, 0, 1, 0), Ok(true));
        assert!(matches!(
            grid.wall_towards(0, 0, 1, -1),
            Err(GridError::InvalidDirection { .. })
        ));
        assert_eq!(
            grid.wall_towards(5, 0, 1, 0),
            Err(GridError::OutOfBounds { x: 5, y: 0 })
        );
    }

    #[test]
    #[should_panic(expected = "outside grid")]
    fn past_the_right_edge_does_not_wrap() {
        let mut grid = CellGrid::filled(4, 4);
        grid.delete_wall(0, 1, Dir::Left);
        // (4, 0) would land on (0, 1) in the flat vector
        grid.has_wall(4, 0, Dir::Left);
    }
}
