//! Breadth-first reachability over the 4-connected grid with walls removed.

use std::collections::VecDeque;

use crate::components::{Dir, Edge, Pos, WallSet};

/// Can `to` be walked to from `from` without crossing a wall?
///
/// Each cell is enqueued at most once, so a call costs O(size²).
pub fn reachable(size: usize, from: Pos, to: Pos, walls: &WallSet) -> bool {
    if !from.in_bounds(size) || !to.in_bounds(size) {
        return false;
    }
    let mut seen = vec![vec![false; size]; size];
    let mut q = VecDeque::new();
    seen[from.y][from.x] = true;
    q.push_back(from);

    while let Some(pos) = q.pop_front() {
        if pos == to {
            return true;
        }
        for dir in Dir::ALL {
            let Some(next) = pos.step(dir, size) else {
                continue;
            };
            if seen[next.y][next.x] {
                continue;
            }
            if is_wall_between(walls, pos, next) {
                continue;
            }
            seen[next.y][next.x] = true;
            q.push_back(next);
        }
    }
    false
}

/// Both segments of the required walk: start to key, then key to door.
pub fn is_solvable(size: usize, start: Pos, key: Pos, door: Pos, walls: &WallSet) -> bool {
    reachable(size, start, key, walls) && reachable(size, key, door, walls)
}

pub fn is_wall_between(walls: &WallSet, a: Pos, b: Pos) -> bool {
    Edge::between(a, b).is_some_and(|edge| walls.contains(&edge))
}
