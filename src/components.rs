use std::collections::HashSet;

/// A cell coordinate. Ordered by `(x, y)`, which is the order walls are normalised with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(self, size: usize) -> bool {
        self.x < size && self.y < size
    }

    /// The neighbour one step towards `dir`, or `None` when it falls off the grid.
    pub fn step(self, dir: Dir, size: usize) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = self.x as isize + dx;
        let ny = self.y as isize + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let next = Pos {
            x: nx as usize,
            y: ny as usize,
        };
        next.in_bounds(size).then_some(next)
    }

    pub fn manhattan(self, other: Pos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn chebyshev(self, other: Pos) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    /// Only the four unit steps map to a direction.
    pub fn from_delta(dx: isize, dy: isize) -> Option<Dir> {
        match (dx, dy) {
            (0, -1) => Some(Dir::Up),
            (0, 1) => Some(Dir::Down),
            (-1, 0) => Some(Dir::Left),
            (1, 0) => Some(Dir::Right),
            _ => None,
        }
    }
}

/// The boundary between two orthogonally adjacent cells.
///
/// Endpoints are kept in canonical `(min, max)` order so that the wall between
/// `a` and `b` is the same value as the wall between `b` and `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    lo: Pos,
    hi: Pos,
}

impl Edge {
    pub fn between(a: Pos, b: Pos) -> Option<Edge> {
        if a.manhattan(b) != 1 {
            return None;
        }
        Some(Edge {
            lo: a.min(b),
            hi: a.max(b),
        })
    }

    pub fn endpoints(self) -> (Pos, Pos) {
        (self.lo, self.hi)
    }
}

pub type WallSet = HashSet<Edge>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_is_order_independent() {
        let a = Pos::new(1, 1);
        let b = Pos::new(1, 2);
        assert_eq!(Edge::between(a, b), Edge::between(b, a));

        let mut walls = WallSet::new();
        walls.insert(Edge::between(b, a).unwrap());
        assert!(walls.contains(&Edge::between(a, b).unwrap()));
    }

    #[test]
    fn edge_requires_adjacent_cells() {
        assert!(Edge::between(Pos::new(0, 0), Pos::new(0, 0)).is_none());
        assert!(Edge::between(Pos::new(0, 0), Pos::new(1, 1)).is_none());
        assert!(Edge::between(Pos::new(0, 0), Pos::new(2, 0)).is_none());
    }

    #[test]
    fn step_stops_at_grid_edges() {
        let corner = Pos::new(0, 0);
        assert_eq!(corner.step(Dir::Up, 5), None);
        assert_eq!(corner.step(Dir::Left, 5), None);
        assert_eq!(corner.step(Dir::Right, 5), Some(Pos::new(1, 0)));
        assert_eq!(Pos::new(4, 4).step(Dir::Down, 5), None);
    }

    #[test]
    fn only_unit_deltas_are_directions() {
        for dir in Dir::ALL {
            let (dx, dy) = dir.delta();
            assert_eq!(Dir::from_delta(dx, dy), Some(dir));
        }
        assert_eq!(Dir::from_delta(1, 1), None);
        assert_eq!(Dir::from_delta(0, 0), None);
        assert_eq!(Dir::from_delta(2, 0), None);
    }
}
