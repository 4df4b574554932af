pub mod event;
pub mod follower;
pub mod level;
pub mod step;
pub mod world;
