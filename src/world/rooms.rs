use log::{debug, warn};
use rand::Rng;

use crate::world::cells::{CellFlags, CellGrid, Dir};

/// Attempts spent on placement before giving up on the remaining rooms.
pub const ROOM_PLACEMENT_TRIES: u32 = 250;
/// Door attempts per room; duplicates are allowed.
pub const DOOR_ATTEMPTS: u32 = 5;
pub const ROOM_MIN_SIDE: i32 = 3;
pub const ROOM_MAX_SIDE: i32 = 8;

/// Axis-aligned block of cells with no interior walls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    #[inline]
    pub fn x_max(&self) -> i32 {
        self.x + self.width - 1
    }

    #[inline]
    pub fn y_max(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x <= self.x_max() && y >= self.y && y <= self.y_max()
    }

    /// Cell just inside the wall with perimeter index `door`, plus the side
    /// the wall sits on. Indices run top edge, bottom edge, left edge, right edge.
    fn door_cell(&self, door: i32) -> (i32, i32, Dir) {
        let (w, h) = (self.width, self.height);
        let (x, y, dir) = if door < 2 * w {
            let top = door < w;
            (door % w, if top { 0 } else { h - 1 }, if top { Dir::Up } else { Dir::Down })
        } else {
            let door = door - 2 * w;
            let left = door < h;
            (if left { 0 } else { w - 1 }, door % h, if left { Dir::Left } else { Dir::Right })
        };
        (x + self.x, y + self.y, dir)
    }
}

impl CellGrid {
    /// Does `room`, grown by one cell on every side, touch an existing room?
    pub fn area_overlaps_room(&self, room: &Room) -> bool {
        for x in room.x - 1..=room.x_max() + 1 {
            for y in room.y - 1..=room.y_max() + 1 {
                if self.is_in_room(x, y) {
                    return true;
                }
            }
        }
        false
    }

    /// Carve `room` out of the grid and surround it with bordered walls,
    /// then knock up to [`DOOR_ATTEMPTS`] doors through its perimeter.
    ///
    /// Room cells stay unvisited so the carver still reaches them.
    pub fn mark_room<R: Rng + ?Sized>(&mut self, room: &Room, rng: &mut R) {
        for x in room.x..=room.x_max() {
            for y in room.y..=room.y_max() {
                self.remove(x, y, CellFlags::WALLS);
                self.insert(x, y, CellFlags::IN_ROOM);
            }
        }
        for x in room.x..=room.x_max() {
            self.add_border_wall(x, room.y, Dir::Up);
            self.add_border_wall(x, room.y_max(), Dir::Down);
        }
        for y in room.y..=room.y_max() {
            self.add_border_wall(room.x, y, Dir::Left);
            self.add_border_wall(room.x_max(), y, Dir::Right);
        }

        let perimeter = 2 * (room.width + room.height);
        for _ in 0..DOOR_ATTEMPTS {
            let (x, y, dir) = room.door_cell(rng.random_range(0..perimeter));
            self.delete_border(x, y, dir);
        }
    }

    /// One placement attempt. `None` when the drawn size does not fit or the
    /// drawn spot is too close to another room.
    pub fn place_room<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Room> {
        let width = rng.random_range(ROOM_MIN_SIDE..=ROOM_MAX_SIDE);
        if width >= self.width() - 4 {
            return None;
        }
        let height = rng.random_range(ROOM_MIN_SIDE..=ROOM_MAX_SIDE);
        if height >= self.height() - 4 {
            return None;
        }
        let room = Room {
            x: rng.random_range(1..=self.width() - width - 1),
            y: rng.random_range(1..=self.height() - height - 1),
            width,
            height,
        };
        if self.area_overlaps_room(&room) {
            return None;
        }
        self.mark_room(&room, rng);
        Some(room)
    }

    /// Place up to `count` rooms, spending at most [`ROOM_PLACEMENT_TRIES`]
    /// attempts across all of them.
    pub fn place_rooms<R: Rng + ?Sized>(&mut self, count: u32, rng: &mut R) -> Vec<Room> {
        let mut rooms = Vec::with_capacity(count as usize);
        for _ in 0..ROOM_PLACEMENT_TRIES {
            if rooms.len() as u32 >= count {
                break;
            }
            if let Some(room) = self.place_room(rng) {
                rooms.push(room);
            }
        }
        if (rooms.len() as u32) < count {
            warn!("placed {} of {} requested rooms", rooms.len(), count);
        } else {
            debug!("placed {} rooms", rooms.len());
        }
        rooms
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn door_indices_walk_the_perimeter() {
        let room = Room { x: 2, y: 3, width: 4, height: 3 };
        assert_eq!(room.door_cell(0), (2, 3, Dir::Up));
        assert_eq!(room.door_cell(3), (5, 3, Dir::Up));
        assert_eq!(room.door_cell(4), (2, 5, Dir::Down));
        assert_eq!(room.door_cell(8), (2, 3, Dir::Left));
        assert_eq!(room.door_cell(10), (2, 5, Dir::Left));
        assert_eq!(room.door_cell(11), (5, 3, Dir::Right));
        assert_eq!(room.door_cell(13), (5, 5, Dir::Right));
    }

    #[test]
    fn room_has_open_interior_and_bordered_rim() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = CellGrid::filled(12, 12);
        let room = Room { x: 3, y: 4, width: 4, height: 3 };
        grid.mark_room(&room, &mut rng);

        for x in room.x..=room.x_max() {
            for y in room.y..=room.y_max() {
                assert!(grid.is_in_room(x, y));
                assert!(!grid.is_visited(x, y));
                if x < room.x_max() {
                    assert!(!grid.has_wall(x, y, Dir::Right));
                }
                if y < room.y_max() {
                    assert!(!grid.has_wall(x, y, Dir::Down));
                }
            }
        }
        // every perimeter edge keeps its wall, doors only drop the border
        for x in room.x..=room.x_max() {
            assert!(grid.has_wall(x, room.y, Dir::Up));
            assert!(grid.has_wall(x, room.y - 1, Dir::Down));
        }
        assert!(!grid.is_in_room(room.x - 1, room.y));
    }

    #[test]
    fn placed_rooms_never_touch() {
        let mut rng = StdRng::seed_from_u64(0xBEEF);
        for _ in 0..20 {
            let mut grid = CellGrid::filled(30, 24);
            let rooms = grid.place_rooms(8, &mut rng);
            for (i, a) in rooms.iter().enumerate() {
                assert!(a.x >= 1 && a.y >= 1);
                assert!(a.x_max() <= grid.width() - 2 && a.y_max() <= grid.height() - 2);
                for b in &rooms[i + 1..] {
                    let gap_x = b.x > a.x_max() + 1 || a.x > b.x_max() + 1;
                    let gap_y = b.y > a.y_max() + 1 || a.y > b.y_max() + 1;
                    assert!(gap_x || gap_y, "{a:?} touches {b:?}");
                }
            }
        }
    }

    #[test]
    fn corner_room_covers_its_cells_and_has_few_doors() {
        let room = Room { x: 1, y: 1, width: 3, height: 3 };
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut grid = CellGrid::filled(8, 8);
            grid.mark_room(&room, &mut rng);

            for y in 0..8 {
                for x in 0..8 {
                    assert_eq!(grid.is_in_room(x, y), room.contains(x, y), "({x}, {y})");
                }
            }

            let perimeter = 2 * (room.width + room.height);
            let gaps = (0..perimeter)
                .map(|i| room.door_cell(i))
                .filter(|&(x, y, dir)| !grid.has_border(x, y, dir))
                .count();
            assert!((1..=DOOR_ATTEMPTS as usize).contains(&gaps), "seed {seed}: {gaps} gaps");
        }
    }

    #[test]
    fn tiny_grid_takes_no_rooms() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = CellGrid::filled(6, 6);
        assert!(grid.place_rooms(3, &mut rng).is_empty());
        assert_eq!(grid, CellGrid::filled(6, 6));
    }
}
