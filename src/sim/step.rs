/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Selection (pick / cancel a block kind)
///   2. Cursor movement
///   3. Placement → raises the reroute flag on success
///   4. Walker tick (reroute first if flagged, then movement)
///   5. Clear / game-over check
///
/// Placement is resolved before the walker moves, so a block placed this
/// tick is already part of the route the walker follows this tick.

use crate::domain::grid::Coord;
use crate::domain::tile::PlaceKind;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

/// Where a placement was requested.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlaceAt {
    Cursor,
    Cell(Coord),
}

/// Frame input, already decoded from keys and mouse.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub select: Option<PlaceKind>,
    pub cancel: bool,
    pub cursor: Option<(i32, i32)>,
    pub place: Option<PlaceAt>,
}

impl FrameInput {
    /// Fold input gathered on a later frame into this one, for frames that
    /// arrive between two ticks. Cursor moves add up; everything else keeps
    /// the latest request.
    pub fn merge(&mut self, later: FrameInput) {
        if later.cancel {
            self.select = None;
            self.place = None;
            self.cancel = true;
        }
        if later.select.is_some() {
            // A new selection drops a placement aimed with the old one.
            self.select = later.select;
            self.place = None;
        }
        if let Some((dx, dy)) = later.cursor {
            let (x, y) = self.cursor.unwrap_or((0, 0));
            self.cursor = Some((x + dx, y + dy));
        }
        if later.place.is_some() { self.place = later.place; }
    }
}

const RESULT_MESSAGE_TICKS: u32 = 0; // stays until the next level / retry
const PLACE_MESSAGE_TICKS: u32 = 45;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput, dt: f32) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 { world.message.clear(); }
    }

    resolve_selection(world, &input);
    resolve_cursor(world, &input);
    resolve_placement(world, &input, &mut events);
    resolve_walker(world, dt, &mut events);
    resolve_outcome(world, &events);

    events
}

// ══════════════════════════════════════════════════════════════
// Player input
// ══════════════════════════════════════════════════════════════

fn resolve_selection(world: &mut WorldState, input: &FrameInput) {
    if input.cancel {
        world.selected = None;
    }
    if let Some(kind) = input.select {
        world.selected = Some(kind);
    }
}

fn resolve_cursor(world: &mut WorldState, input: &FrameInput) {
    if let Some((dx, dy)) = input.cursor {
        world.move_cursor(dx, dy);
    }
}

fn resolve_placement(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    let Some(target) = input.place else { return };
    let Some(kind) = world.selected else { return };

    let at = match target {
        PlaceAt::Cursor => world.cursor,
        PlaceAt::Cell(c) => c,
    };

    if world.place_block(kind, at) {
        events.push(GameEvent::BlockPlaced { kind, x: at.x, y: at.y });
        world.set_message(&format!("{} placed", kind.label()), PLACE_MESSAGE_TICKS);
    } else {
        events.push(GameEvent::PlacementRejected { kind, x: at.x, y: at.y });
        let need = match kind {
            PlaceKind::Bridge => "a river",
            PlaceKind::Crate => "open ground",
        };
        world.set_message(&format!("{} must go on {}", kind.label(), need), PLACE_MESSAGE_TICKS);
    }
}

// ══════════════════════════════════════════════════════════════
// Walker
// ══════════════════════════════════════════════════════════════

fn resolve_walker(world: &mut WorldState, dt: f32, events: &mut Vec<GameEvent>) {
    let changed = std::mem::take(&mut world.reroute_pending);
    world.walker.tick(&mut world.grid, dt, changed, events);
}

fn resolve_outcome(world: &mut WorldState, events: &[GameEvent]) {
    if world.walker.is_cleared() {
        world.phase = Phase::Cleared;
        world.selected = None;
        world.set_message("Goal reached!", RESULT_MESSAGE_TICKS);
        return;
    }

    if world.walker.is_failed() {
        let reason = events.iter().find_map(|e| match e {
            GameEvent::Drowned { .. } => Some("Swept away by the river"),
            GameEvent::CaughtByEnemy { .. } => Some("Caught by an enemy"),
            GameEvent::NoRoute => Some("No way left to the goal"),
            _ => None,
        }).unwrap_or("The walker is lost");
        world.phase = Phase::GameOver;
        world.selected = None;
        world.set_message(reason, RESULT_MESSAGE_TICKS);
    }
}
