/// Events emitted during a simulation step.
/// The presentation layer consumes these for status messages and logging.

use crate::domain::tile::PlaceKind;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    BlockPlaced { kind: PlaceKind, x: i32, y: i32 },
    PlacementRejected { kind: PlaceKind, x: i32, y: i32 },
    Rerouted { len: usize },
    Stepped { x: i32, y: i32 },
    Drowned { x: i32, y: i32 },
    CaughtByEnemy { x: i32, y: i32 },
    NoRoute,
    GoalReached,
}
