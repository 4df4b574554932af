/// Route search — A* over the grid with a Manhattan heuristic.
///
/// Unit step cost, 4-way movement. Neighbors are expanded in the fixed
/// order +x, -x, -y, +y; together with the FIFO tie-break of the queue this
/// makes the chosen route fully deterministic.
///
/// Passability here is search passability only: River and Enemy cells are
/// routed through like open ground. Whether the walker survives arriving
/// there is decided by the follower, not by the search.

use super::grid::{Coord, Grid};
use super::queue::PriorityQueue;

/// Ordered cells from start to goal, both inclusive. Empty = unreachable.
pub type Route = Vec<Coord>;

const DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, -1), (0, 1)];

/// Best-known cost before a cell is first reached.
const UNREACHED: i32 = i32::MAX;

#[derive(Clone, Copy, Debug)]
struct Node {
    at: Coord,
    act_cost: i32,
}

pub fn search(grid: &Grid, start: Coord, goal: Coord) -> Route {
    let Some(start_idx) = grid.index(start) else { return Route::new() };
    let cells = grid.width() * grid.height();

    let mut open: PriorityQueue<Node> = PriorityQueue::with_capacity(cells);
    let mut closed = vec![false; cells];
    let mut act_costs = vec![UNREACHED; cells];
    let mut parents: Vec<Option<Coord>> = vec![None; cells];

    act_costs[start_idx] = 0;
    open.enqueue(Node { at: start, act_cost: 0 }, start.manhattan(goal));

    while let Ok(curr) = open.dequeue() {
        if curr.at == goal {
            log::trace!("reached {:?} with {} nodes still open", goal, open.len());
            return rebuild(grid, &parents, start, goal);
        }

        let Some(ci) = grid.index(curr.at) else { continue };
        if closed[ci] { continue; }
        closed[ci] = true;

        for &(dx, dy) in &DIRS {
            let next = curr.at.offset(dx, dy);
            if next == start { continue; }
            if !grid.cell_at(next).is_search_passable() { continue; }
            let Some(ni) = grid.index(next) else { continue };
            if closed[ni] { continue; }

            let act = curr.act_cost + 1;
            if act >= act_costs[ni] { continue; }
            act_costs[ni] = act;
            parents[ni] = Some(curr.at);

            open.enqueue(Node { at: next, act_cost: act }, act.saturating_add(next.manhattan(goal)));
        }
    }

    debug_assert!(open.is_empty());
    log::debug!("no route from {:?} to {:?}", start, goal);
    Route::new()
}

/// Walk parent links back from the goal, then reverse.
fn rebuild(grid: &Grid, parents: &[Option<Coord>], start: Coord, goal: Coord) -> Route {
    let mut route = vec![goal];
    let mut at = goal;
    while at != start {
        let parent = grid.index(at).and_then(|i| parents[i]);
        match parent {
            Some(p) => {
                route.push(p);
                at = p;
            }
            None => {
                log::error!("broken parent chain at {:?} while rebuilding route", at);
                return Route::new();
            }
        }
    }
    route.reverse();
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::test_util::{cells_from, grid_from};
    use crate::domain::tile::{CellType, PlaceKind};

    use std::collections::VecDeque;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    fn search_level(g: &Grid) -> Route {
        let start = g.character().unwrap();
        let goal = g.goal().unwrap();
        search(g, start, goal)
    }

    fn assert_well_formed(route: &Route, start: Coord, goal: Coord) {
        assert_eq!(route.first(), Some(&start));
        assert_eq!(route.last(), Some(&goal));
        for pair in route.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1, "non-adjacent step {:?}", pair);
        }
    }

    /// Shortest step count under the same passability rule, by BFS.
    fn bfs_distance(g: &Grid, start: Coord, goal: Coord) -> Option<usize> {
        let mut dist = vec![usize::MAX; g.width() * g.height()];
        let mut queue = VecDeque::new();
        dist[g.index(start)?] = 0;
        queue.push_back(start);
        while let Some(at) = queue.pop_front() {
            let d = dist[g.index(at)?];
            if at == goal { return Some(d); }
            for &(dx, dy) in &DIRS {
                let n = at.offset(dx, dy);
                if !g.cell_at(n).is_search_passable() { continue; }
                let Some(ni) = g.index(n) else { continue };
                if dist[ni] == usize::MAX {
                    dist[ni] = d + 1;
                    queue.push_back(n);
                }
            }
        }
        None
    }

    #[test]
    fn three_by_three_scenario() {
        let g = grid_from(&[
            "@.#",
            "...",
            "#.G",
        ]);
        let route = search_level(&g);
        // +x is tried first and equal-cost nodes leave the queue in
        // insertion order, so the route turns right at (1,1).
        assert_eq!(route, vec![c(0, 0), c(1, 0), c(1, 1), c(2, 1), c(2, 2)]);
    }

    #[test]
    fn straight_corridor() {
        let g = grid_from(&["@...G"]);
        let route = search_level(&g);
        assert_eq!(route, (0..5).map(|x| c(x, 0)).collect::<Vec<_>>());
    }

    #[test]
    fn start_equals_goal() {
        let g = grid_from(&["@.G"]);
        assert_eq!(search(&g, c(2, 0), c(2, 0)), vec![c(2, 0)]);
    }

    #[test]
    fn start_outside_grid_yields_empty() {
        let g = grid_from(&["@.G"]);
        assert!(search(&g, c(-1, 0), c(2, 0)).is_empty());
    }

    #[test]
    fn far_off_goal_is_unreachable_not_a_panic() {
        let g = grid_from(&["@.G"]);
        assert!(search(&g, c(0, 0), c(i32::MAX, i32::MIN)).is_empty());
        assert!(search(&g, c(0, 0), c(i32::MIN, i32::MAX)).is_empty());
    }

    #[test]
    fn repeated_search_is_identical() {
        let g = grid_from(&[
            "@.....",
            "..#...",
            "......",
            "...#..",
            ".....G",
        ]);
        let first = search_level(&g);
        for _ in 0..10 {
            assert_eq!(search_level(&g), first);
        }
        assert_eq!(first.len(), 10);
    }

    #[test]
    fn enclosed_goal_has_no_route() {
        let g = grid_from(&[
            "@....",
            "...#.",
            "..#GC",
            "...#.",
        ]);
        assert!(search_level(&g).is_empty());
    }

    #[test]
    fn walled_off_start_has_no_route() {
        let g = grid_from(&[
            "@#..",
            "#...",
            "...G",
        ]);
        assert!(search_level(&g).is_empty());
    }

    #[test]
    fn invalid_cells_block_like_walls() {
        let g = grid_from(&["@?G"]);
        assert!(search_level(&g).is_empty());
    }

    #[test]
    fn rivers_and_enemies_are_routed_through() {
        let g = grid_from(&[
            "@~EG",
            ".##.",
            "....",
        ]);
        let route = search_level(&g);
        assert_eq!(route, vec![c(0, 0), c(1, 0), c(2, 0), c(3, 0)]);
    }

    #[test]
    fn crate_forces_detour() {
        let mut g = grid_from(&[
            "@..",
            "...",
            "..G",
        ]);
        let before = search_level(&g);
        assert_eq!(before.len(), 5);
        assert!(g.place_block(PlaceKind::Crate, 1, 0));
        let after = search_level(&g);
        assert_eq!(after.len(), 5);
        assert!(!after.contains(&c(1, 0)));
        assert_well_formed(&after, c(0, 0), c(2, 2));
    }

    #[test]
    fn crate_can_cut_the_only_route() {
        let mut g = grid_from(&[
            "@.#",
            "#.#",
            "#.G",
        ]);
        assert!(!search_level(&g).is_empty());
        assert!(g.place_block(PlaceKind::Crate, 1, 1));
        assert!(search_level(&g).is_empty());
    }

    #[test]
    fn bridge_does_not_change_route_shape() {
        let mut g = grid_from(&["@~G"]);
        let before = search_level(&g);
        assert!(g.place_block(PlaceKind::Bridge, 1, 0));
        assert_eq!(search_level(&g), before);
    }

    #[test]
    fn route_from_mid_level_start() {
        let g = grid_from(&[
            "@....",
            ".###.",
            "....G",
        ]);
        let route = search(&g, c(0, 2), c(4, 2));
        assert_eq!(route.len(), 5);
        assert_well_formed(&route, c(0, 2), c(4, 2));
    }

    #[test]
    fn matches_bfs_on_random_grids() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut reachable = 0;
        for _ in 0..300 {
            let w = rng.gen_range(2..=9);
            let h = rng.gen_range(2..=9);
            let mut rows: Vec<Vec<CellType>> = (0..h)
                .map(|_| (0..w).map(|_| match rng.gen_range(0..10) {
                    0 | 1 => CellType::Wall,
                    2 => CellType::Crate,
                    3 => CellType::River,
                    4 => CellType::Enemy,
                    _ => CellType::Open,
                }).collect())
                .collect();

            let start = c(rng.gen_range(0..w), rng.gen_range(0..h));
            let mut goal = c(rng.gen_range(0..w), rng.gen_range(0..h));
            while goal == start {
                goal = c(rng.gen_range(0..w), rng.gen_range(0..h));
            }
            rows[start.y as usize][start.x as usize] = CellType::Character;
            rows[goal.y as usize][goal.x as usize] = CellType::Goal;
            let g = Grid::from_rows(rows).unwrap();

            let route = search(&g, start, goal);
            match bfs_distance(&g, start, goal) {
                Some(d) => {
                    reachable += 1;
                    assert_eq!(route.len(), d + 1, "grid {:?}", g);
                    assert_well_formed(&route, start, goal);
                    for &step in &route {
                        assert!(g.cell_at(step).is_search_passable());
                    }
                }
                None => assert!(route.is_empty(), "grid {:?}", g),
            }
        }
        assert!(reachable > 50);
    }

    #[test]
    fn long_route_beyond_small_cost_caps() {
        // Serpentine corridor whose route is longer than 99 steps.
        let mut rows = Vec::new();
        for y in 0..21 {
            let row: String = (0..12).map(|x| {
                if y % 2 == 0 { '.' }
                else if (y / 2) % 2 == 0 { if x == 11 { '.' } else { '#' } }
                else if x == 0 { '.' } else { '#' }
            }).collect();
            rows.push(row);
        }
        let mut cells = cells_from(&rows.iter().map(String::as_str).collect::<Vec<_>>());
        cells[0][0] = CellType::Character;
        cells[20][11] = CellType::Goal;
        let g = Grid::from_rows(cells).unwrap();
        let route = search_level(&g);
        assert_eq!(route.len(), 11 * 11 + 20 + 1);
    }
}
