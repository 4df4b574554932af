/// WorldState: the complete snapshot of a running level.
///
/// ## Grid layers
///
///   - `level.grid` — the level as loaded. **Never mutated.**
///   - `grid`       — the live grid (placements, walker marker).
///
/// Live-grid writes go through exactly two paths:
///   - `place_block()` here, for the player
///   - `PathFollower::tick()`, for the walker marker
///
/// A successful placement raises `reroute_pending`; the next step hands it
/// to the walker once and clears it.

use crate::config::SpeedConfig;
use crate::domain::grid::{Coord, Grid};
use crate::domain::tile::PlaceKind;
use crate::error::LevelResult;
use super::follower::PathFollower;
use super::level::LevelDef;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Cleared,
    GameOver,
    Complete,
}

pub struct WorldState {
    pub level: LevelDef,
    pub grid: Grid,
    pub walker: PathFollower,
    pub reroute_pending: bool,

    // ── Placement ──
    pub selected: Option<PlaceKind>,
    pub cursor: Coord,

    // ── Meta ──
    pub phase: Phase,
    pub current_level: usize,
    pub total_levels: usize,
    pub tick: u64,
    pub speed: SpeedConfig,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    pub fn new(level: LevelDef, current_level: usize, total_levels: usize, speed: SpeedConfig) -> LevelResult<Self> {
        let grid = level.grid.clone();
        let walker = PathFollower::new(&grid, speed.arrival_time)?;
        let cursor = walker.cell();
        log::info!("level {} '{}' started", current_level + 1, level.name);
        Ok(WorldState {
            level,
            grid,
            walker,
            reroute_pending: false,
            selected: None,
            cursor,
            phase: Phase::Playing,
            current_level,
            total_levels,
            tick: 0,
            speed,
            message: String::new(),
            message_timer: 0,
        })
    }

    /// Put the level back to its loaded state.
    pub fn restart(&mut self) -> LevelResult<()> {
        self.grid = self.level.grid.clone();
        self.walker = PathFollower::new(&self.grid, self.speed.arrival_time)?;
        self.reroute_pending = false;
        self.selected = None;
        self.cursor = self.walker.cell();
        self.phase = Phase::Playing;
        self.tick = 0;
        self.message.clear();
        self.message_timer = 0;
        log::info!("level '{}' restarted", self.level.name);
        Ok(())
    }

    /// Place the selected block. The selection is consumed whether or not
    /// the placement succeeds.
    pub fn place_block(&mut self, kind: PlaceKind, at: Coord) -> bool {
        self.selected = None;
        let placed = self.grid.place_block(kind, at.x, at.y);
        if placed {
            self.reroute_pending = true;
        }
        log::debug!("place {:?} at {:?}: {}", kind, at, placed);
        placed
    }

    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let max_x = self.grid.width() as i32 - 1;
        let max_y = self.grid.height() as i32 - 1;
        self.cursor = Coord::new(
            (self.cursor.x + dx).clamp(0, max_x),
            (self.cursor.y + dy).clamp(0, max_y),
        );
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::test_util::world_from;
    use crate::domain::tile::CellType;

    #[test]
    fn new_world_starts_at_walker() {
        let w = world_from(&["..", "@G"]);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.cursor, Coord::new(0, 1));
        assert!(!w.reroute_pending);
    }

    #[test]
    fn placement_success_requests_reroute() {
        let mut w = world_from(&["@.~G"]);
        w.selected = Some(PlaceKind::Bridge);
        assert!(w.place_block(PlaceKind::Bridge, Coord::new(2, 0)));
        assert!(w.reroute_pending);
        assert_eq!(w.selected, None);
        assert_eq!(w.level.grid.cell_type(2, 0), CellType::River);
    }

    #[test]
    fn rejected_placement_still_clears_selection() {
        let mut w = world_from(&["@.~G"]);
        w.selected = Some(PlaceKind::Crate);
        assert!(!w.place_block(PlaceKind::Crate, Coord::new(2, 0)));
        assert!(!w.reroute_pending);
        assert_eq!(w.selected, None);
    }

    #[test]
    fn cursor_is_clamped_to_grid() {
        let mut w = world_from(&["@.", ".G"]);
        w.move_cursor(-5, 0);
        assert_eq!(w.cursor, Coord::new(0, 0));
        w.move_cursor(3, 3);
        assert_eq!(w.cursor, Coord::new(1, 1));
    }

    #[test]
    fn restart_restores_pristine_grid() {
        let mut w = world_from(&["@..G"]);
        assert!(w.place_block(PlaceKind::Crate, Coord::new(2, 0)));
        w.phase = Phase::GameOver;
        w.restart().unwrap();
        assert_eq!(w.grid, w.level.grid);
        assert_eq!(w.phase, Phase::Playing);
        assert!(!w.reroute_pending);
        assert_eq!(w.walker.route().len(), 4);
    }
}
