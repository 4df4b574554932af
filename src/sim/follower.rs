/// The walker: follows the current route one cell at a time.
///
/// ## States
///
/// ┌────────────┬──────────────────────────────────────────────┐
/// │ State      │ Meaning                                      │
/// ├────────────┼──────────────────────────────────────────────┤
/// │ Idle       │ settled on `route[0]`, fraction = 0          │
/// │ Advancing  │ between `route[0]` and `route[1]`            │
/// │ Blocked    │ no route existed at level entry              │
/// │ Cleared    │ arrived on the goal (terminal)               │
/// │ Failed     │ hazard arrival or no route (terminal)        │
/// └────────────┴──────────────────────────────────────────────┘
///
/// ## Per-tick order
///   1. Reroute if the grid changed (empty route → Failed, no movement)
///   2. Advance the interpolation fraction toward `route[1]`
///   3. On fraction ≥ 1: arrival check → move marker → pop route head
///
/// `route[0]` is always the last settled cell.

use crate::domain::grid::{Coord, Grid};
use crate::domain::path::{self, Route};
use crate::domain::tile::CellType;
use crate::error::{LevelError, LevelResult};
use super::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FollowState {
    Idle,
    Advancing,
    Blocked,
    Cleared,
    Failed,
}

impl FollowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FollowState::Cleared | FollowState::Failed)
    }
}

#[derive(Clone, Debug)]
pub struct PathFollower {
    cell: Coord,
    goal: Coord,
    route: Route,
    fraction: f32,
    arrival_time: f32,
    state: FollowState,
}

impl PathFollower {
    /// Locate the walker and the goal, then plan the first route.
    pub fn new(grid: &Grid, arrival_time: f32) -> LevelResult<Self> {
        let cell = grid.character().ok_or(LevelError::MissingCharacter)?;
        let goal = grid.goal().ok_or(LevelError::MissingGoal)?;
        let route = path::search(grid, cell, goal);
        let state = if route.is_empty() { FollowState::Blocked } else { FollowState::Idle };
        log::info!(
            "walker at {:?}, goal at {:?}, initial route {} cells",
            cell, goal, route.len()
        );
        Ok(PathFollower {
            cell,
            goal,
            route,
            fraction: 0.0,
            arrival_time: arrival_time.max(f32::EPSILON),
            state,
        })
    }

    pub fn state(&self) -> FollowState {
        self.state
    }

    pub fn cell(&self) -> Coord {
        self.cell
    }

    pub fn route(&self) -> &[Coord] {
        &self.route
    }

    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    pub fn is_cleared(&self) -> bool {
        self.state == FollowState::Cleared
    }

    pub fn is_failed(&self) -> bool {
        self.state == FollowState::Failed
    }

    /// Interpolated position in cell space.
    pub fn position(&self) -> (f32, f32) {
        let from = self.cell;
        let to = match self.route.get(1) {
            Some(&next) if !self.state.is_terminal() => next,
            _ => from,
        };
        let t = self.fraction;
        (
            from.x as f32 + (to.x - from.x) as f32 * t,
            from.y as f32 + (to.y - from.y) as f32 * t,
        )
    }

    /// Advance by `dt` seconds. `grid_changed` must be true exactly once
    /// after each successful placement.
    pub fn tick(&mut self, grid: &mut Grid, dt: f32, grid_changed: bool, events: &mut Vec<GameEvent>) {
        if self.state.is_terminal() { return; }

        if grid_changed && !self.reroute(grid, events) {
            return;
        }

        if self.state == FollowState::Blocked {
            self.fail_no_route(events);
            return;
        }

        let Some(&next) = self.route.get(1) else {
            // Route of one cell: already standing on the goal.
            self.state = FollowState::Cleared;
            events.push(GameEvent::GoalReached);
            return;
        };

        self.state = FollowState::Advancing;
        self.fraction += dt / self.arrival_time;
        if self.fraction < 1.0 { return; }

        self.fraction = 0.0;
        self.arrive(grid, next, events);
    }

    /// Re-plan from the current resting cell. Progress toward the next cell
    /// carries over, even when the next cell changes. Returns false when the
    /// goal became unreachable (the walker is now Failed).
    fn reroute(&mut self, grid: &Grid, events: &mut Vec<GameEvent>) -> bool {
        self.route = path::search(grid, self.cell, self.goal);

        if self.route.is_empty() {
            self.fail_no_route(events);
            return false;
        }

        if self.state == FollowState::Blocked {
            self.state = FollowState::Idle;
        }
        log::debug!("rerouted from {:?}: {} cells", self.cell, self.route.len());
        events.push(GameEvent::Rerouted { len: self.route.len() });
        true
    }

    fn arrive(&mut self, grid: &mut Grid, next: Coord, events: &mut Vec<GameEvent>) {
        match grid.cell_at(next) {
            CellType::River => {
                self.state = FollowState::Failed;
                events.push(GameEvent::Drowned { x: next.x, y: next.y });
            }
            CellType::Enemy => {
                self.state = FollowState::Failed;
                events.push(GameEvent::CaughtByEnemy { x: next.x, y: next.y });
            }
            CellType::Goal => {
                self.state = FollowState::Cleared;
                events.push(GameEvent::GoalReached);
            }
            _ => {
                self.state = FollowState::Idle;
            }
        }

        grid.move_character(self.cell, next);
        self.route.remove(0);
        self.cell = next;
        events.push(GameEvent::Stepped { x: next.x, y: next.y });

        if self.state.is_terminal() {
            log::info!("walker stopped at {:?}: {:?}", next, self.state);
        }
    }

    fn fail_no_route(&mut self, events: &mut Vec<GameEvent>) {
        log::info!("no route from {:?} to goal {:?}", self.cell, self.goal);
        self.route.clear();
        self.state = FollowState::Failed;
        events.push(GameEvent::NoRoute);
    }
}
