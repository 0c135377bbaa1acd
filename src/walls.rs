//! Random wall placement that never breaks the start -> key -> door walk.

use std::collections::HashSet;

use log::trace;
use rand::Rng;

use crate::components::{Dir, Edge, Pos, WallSet};
use crate::connectivity::is_solvable;

/// The anchors plus their in-bounds orthogonal neighbours.
pub type EssentialCells = HashSet<Pos>;

pub fn essential_cells(size: usize, anchors: &[Pos]) -> EssentialCells {
    let mut cells = EssentialCells::new();
    for &anchor in anchors {
        cells.insert(anchor);
        for dir in Dir::ALL {
            if let Some(next) = anchor.step(dir, size) {
                cells.insert(next);
            }
        }
    }
    cells
}

/// Which candidate walls are refused outright, before any reachability check.
#[derive(Debug, Clone, Copy)]
pub enum AnchorGuard<'a> {
    /// Refuse walls whose two endpoints are both essential cells.
    Essential(&'a EssentialCells),
    /// Refuse walls with either endpoint within Chebyshev `radius` of an anchor.
    Clearance { anchors: [Pos; 3], radius: usize },
}

impl AnchorGuard<'_> {
    pub fn refuses(&self, edge: Edge) -> bool {
        let (a, b) = edge.endpoints();
        match self {
            AnchorGuard::Essential(cells) => cells.contains(&a) && cells.contains(&b),
            AnchorGuard::Clearance { anchors, radius } => anchors
                .iter()
                .any(|&anchor| a.chebyshev(anchor) <= *radius || b.chebyshev(anchor) <= *radius),
        }
    }
}

/// Propose `size²` walls and keep the ones that leave both path segments open.
///
/// Each proposal goes ahead with probability `density`. A refused or rejected
/// candidate is dropped for good, so fewer walls than `density` suggests is normal.
/// `size` must be at least 2; `LevelConfig` guarantees it.
pub fn place_walls(
    rng: &mut impl Rng,
    size: usize,
    start: Pos,
    key: Pos,
    door: Pos,
    density: f64,
    guard: AnchorGuard<'_>,
) -> WallSet {
    debug_assert!(size >= 2, "no edges on a {size}x{size} grid");
    let mut walls = WallSet::new();
    let density = if density.is_nan() { 0.0 } else { density.clamp(0.0, 1.0) };

    for _ in 0..size * size {
        if !rng.gen_bool(density) {
            continue;
        }
        let edge = random_edge(rng, size);
        if walls.contains(&edge) || guard.refuses(edge) {
            continue;
        }
        walls.insert(edge);
        if !is_solvable(size, start, key, door, &walls) {
            trace!("dropping wall {:?}: it would cut the path", edge);
            walls.remove(&edge);
        }
    }
    walls
}

/// A uniformly drawn in-bounds edge of a uniformly drawn orientation.
fn random_edge(rng: &mut impl Rng, size: usize) -> Edge {
    let (a, b) = if rng.gen_bool(0.5) {
        let x = rng.gen_range(0..size);
        let y = rng.gen_range(0..size - 1);
        (Pos::new(x, y), Pos::new(x, y + 1))
    } else {
        let x = rng.gen_range(0..size - 1);
        let y = rng.gen_range(0..size);
        (Pos::new(x, y), Pos::new(x + 1, y))
    };
    Edge::between(a, b).expect("cells one step apart are adjacent")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn essential_cells_are_clamped_to_grid() {
        let cells = essential_cells(5, &[Pos::new(0, 0)]);
        let expected: EssentialCells = [Pos::new(0, 0), Pos::new(1, 0), Pos::new(0, 1)].into_iter().collect();
        assert_eq!(cells, expected);

        let cells = essential_cells(5, &[Pos::new(2, 2)]);
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn zero_density_places_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (start, key, door) = (Pos::new(0, 0), Pos::new(2, 2), Pos::new(4, 4));
        let cells = essential_cells(5, &[start, key, door]);
        let walls = place_walls(&mut rng, 5, start, key, door, 0.0, AnchorGuard::Essential(&cells));
        assert!(walls.is_empty());
    }

    #[test]
    fn placed_walls_respect_guard_and_path() {
        let (start, key, door) = (Pos::new(0, 0), Pos::new(6, 1), Pos::new(3, 6));
        let cells = essential_cells(7, &[start, key, door]);
        for seed in 0..40 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let walls = place_walls(&mut rng, 7, start, key, door, 1.0, AnchorGuard::Essential(&cells));
            assert!(is_solvable(7, start, key, door, &walls));
            for edge in &walls {
                let (a, b) = edge.endpoints();
                assert!(!(cells.contains(&a) && cells.contains(&b)));
                assert!(a.in_bounds(7) && b.in_bounds(7));
            }
        }
    }

    #[test]
    fn clearance_guard_keeps_anchor_surroundings_open() {
        let anchors = [Pos::new(0, 0), Pos::new(6, 4), Pos::new(9, 9)];
        let guard = AnchorGuard::Clearance { anchors, radius: 1 };
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let walls = place_walls(&mut rng, 10, anchors[0], anchors[1], anchors[2], 0.3, guard);
            for edge in &walls {
                let (a, b) = edge.endpoints();
                for anchor in anchors {
                    assert!(a.chebyshev(anchor) > 1);
                    assert!(b.chebyshev(anchor) > 1);
                }
            }
        }
    }

    #[test]
    fn same_seed_same_walls() {
        let (start, key, door) = (Pos::new(0, 0), Pos::new(3, 1), Pos::new(1, 4));
        let cells = essential_cells(5, &[start, key, door]);
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            place_walls(&mut rng, 5, start, key, door, 0.5, AnchorGuard::Essential(&cells))
        };
        assert_eq!(run(11), run(11));
    }
}
