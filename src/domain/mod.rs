pub mod grid;
pub mod path;
pub mod queue;
pub mod tile;
pub mod transform;
